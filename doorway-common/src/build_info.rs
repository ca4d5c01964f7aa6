//! Build identification
//!
//! The build stamp is a display-only string. It comes from, in priority order:
//! 1. An explicit override (deploy config or `DOORWAY_BUILD_STAMP` at runtime)
//! 2. `DOORWAY_BUILD_STAMP` set when the crate was compiled
//! 3. The literal `dev`
//!
//! Git hash, timestamp and profile are captured by `build.rs` and are only
//! used for diagnostics output.

use serde::Serialize;

/// Stamp shown when nothing else was supplied
pub const DEFAULT_BUILD_STAMP: &str = "dev";

/// Build identification handed to components through the page context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Display stamp (cache-busting proof in the rendered page)
    pub stamp: String,
    /// Short git hash captured at compile time
    pub git_hash: String,
    /// RFC 3339 compile timestamp
    pub built_at: String,
    /// Cargo profile (debug/release)
    pub profile: String,
}

impl BuildInfo {
    /// Build info as compiled, without any runtime override
    pub fn compiled() -> Self {
        let stamp = option_env!("DOORWAY_BUILD_STAMP")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BUILD_STAMP);

        Self {
            stamp: stamp.to_string(),
            git_hash: env!("DOORWAY_GIT_HASH").to_string(),
            built_at: env!("DOORWAY_BUILD_TIMESTAMP").to_string(),
            profile: env!("DOORWAY_BUILD_PROFILE").to_string(),
        }
    }

    /// Replace the display stamp if `stamp` is non-blank
    pub fn with_stamp_override(mut self, stamp: Option<&str>) -> Self {
        if let Some(s) = stamp.map(str::trim).filter(|s| !s.is_empty()) {
            self.stamp = s.to_string();
        }
        self
    }

    /// One-line description for diagnostics logs
    pub fn describe(&self) -> String {
        format!(
            "{} (git {}, built {}, {})",
            self.stamp, self.git_hash, self.built_at, self.profile
        )
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::compiled()
    }
}
