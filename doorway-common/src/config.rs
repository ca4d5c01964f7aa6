//! Deploy-time configuration: engine destination URLs and the build stamp
//!
//! Resolution follows the usual priority order:
//! 1. Environment variable
//! 2. TOML config file
//! 3. Compiled default
//!
//! Blank values (after trimming) count as "not configured" at every level.
//! Orion always ends up with a URL because it has a compiled default.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Compiled default for the Orion engine
pub const DEFAULT_ORION_URL: &str = "https://orion-messenger.com";

pub const ENV_ORION_URL: &str = "DOORWAY_ENGINE_ORION_URL";
pub const ENV_GPT4O_URL: &str = "DOORWAY_ENGINE_GPT4O_URL";
pub const ENV_GPT5_URL: &str = "DOORWAY_ENGINE_GPT5_URL";
pub const ENV_BUILD_STAMP: &str = "DOORWAY_BUILD_STAMP";

/// Resolved engine destination URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineUrls {
    pub orion: String,
    pub gpt4o: Option<String>,
    pub gpt5: Option<String>,
}

impl Default for EngineUrls {
    fn default() -> Self {
        Self {
            orion: DEFAULT_ORION_URL.to_string(),
            gpt4o: None,
            gpt5: None,
        }
    }
}

/// Deploy-time configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployConfig {
    pub engines: EngineUrls,
    /// Build stamp override (None = use the compiled stamp)
    pub build_stamp: Option<String>,
}

/// On-disk TOML layout
#[derive(Debug, Clone, Default, Deserialize)]
struct DeployToml {
    #[serde(default)]
    build_stamp: Option<String>,
    #[serde(default)]
    engines: EnginesToml,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EnginesToml {
    #[serde(default)]
    orion_url: Option<String>,
    #[serde(default)]
    gpt4o_url: Option<String>,
    #[serde(default)]
    gpt5_url: Option<String>,
}

impl DeployConfig {
    /// Load configuration from an optional TOML file plus environment overrides
    ///
    /// A file that was asked for but cannot be read or parsed is an error;
    /// a missing `path` simply means "no file layer".
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Cannot read config file {}: {}", p.display(), e))
                })?;
                debug!("Loaded deploy config from {}", p.display());
                toml::from_str::<DeployToml>(&content)?
            }
            None => DeployToml::default(),
        };

        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file = toml::from_str::<DeployToml>(content)?;
        Ok(Self::resolve(file, |_| None))
    }

    fn resolve(file: DeployToml, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |key: &str, from_file: Option<String>| {
            non_blank(env(key)).or_else(|| non_blank(from_file))
        };

        let engines = EngineUrls {
            orion: pick(ENV_ORION_URL, file.engines.orion_url)
                .unwrap_or_else(|| DEFAULT_ORION_URL.to_string()),
            gpt4o: pick(ENV_GPT4O_URL, file.engines.gpt4o_url),
            gpt5: pick(ENV_GPT5_URL, file.engines.gpt5_url),
        };

        debug!(
            orion = %engines.orion,
            gpt4o = engines.gpt4o.is_some(),
            gpt5 = engines.gpt5.is_some(),
            "Engine URLs resolved"
        );

        Self {
            engines,
            build_stamp: pick(ENV_BUILD_STAMP, file.build_stamp),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
