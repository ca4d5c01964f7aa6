//! Journey configuration
//!
//! Section table, audio sources, loop mode, observer threshold and feature
//! flags, loaded from an optional TOML file. Every table is optional and falls
//! back to the built-in journey:
//!
//! ```toml
//! [[sections]]
//! id = "threshold"
//! title = "The Threshold"
//! cue_seconds = 0.0
//!
//! [audio]
//! sources = ["https://cdn.example.com/doorway.mp3", "/doorway.mp3"]
//! loop_mode = "soft"
//! soft_from = 5.0
//! soft_to = 10.0
//!
//! [observer]
//! threshold = 0.6
//!
//! [site]
//! url = "https://asarchitect.com/"
//!
//! [flags]
//! audio_auto_unlock = true
//! smooth_scroll = true
//! external_link_guard = false
//! ```

use crate::journey::{
    default_sections, default_sources, NarrativeSection, SectionTable, SourceFallbackChain,
    DEFAULT_ACTIVE_THRESHOLD,
};
use crate::{Error, Result};
use doorway_common::events::LoopMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Overrides the session store location
pub const ENV_SESSION_STORE: &str = "DOORWAY_SESSION_STORE";

/// Address the doorway page is served from
pub const DEFAULT_SITE_URL: &str = "https://asarchitect.com/";

/// Loop mode as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopModeSetting {
    #[default]
    Native,
    Soft,
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sources: Vec<String>,
    pub loop_mode: LoopModeSetting,
    pub soft_from: f64,
    /// 0 = loop to end of track
    pub soft_to: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            loop_mode: LoopModeSetting::Native,
            soft_from: 0.0,
            soft_to: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverSettings {
    /// Visible fraction a section needs to become active
    pub threshold: f64,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ACTIVE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Page address; outbound links are compared against its origin
    pub url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SITE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Retry playback on the first user interaction
    pub audio_auto_unlock: bool,
    /// Handle `#section` links in-page instead of leaving them to the host
    pub smooth_scroll: bool,
    /// Ask before following a link to another origin
    pub external_link_guard: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            audio_auto_unlock: true,
            smooth_scroll: true,
            external_link_guard: false,
        }
    }
}

/// Complete journey configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyConfig {
    pub sections: Vec<NarrativeSection>,
    pub audio: AudioSettings,
    pub observer: ObserverSettings,
    pub site: SiteSettings,
    pub flags: FeatureFlags,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            audio: AudioSettings::default(),
            observer: ObserverSettings::default(),
            site: SiteSettings::default(),
            flags: FeatureFlags::default(),
        }
    }
}

impl JourneyConfig {
    /// Load from a TOML file, or the built-in journey when `path` is None
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No journey config file, using built-in journey");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read journey config {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            sections = config.sections.len(),
            sources = config.audio.sources.len(),
            "Loaded journey config"
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks; the section table and source chain are rebuilt
    /// from these values later, so failures surface here first.
    pub fn validate(&self) -> Result<()> {
        self.section_table()?;
        self.source_chain()?;
        Ok(())
    }

    pub fn section_table(&self) -> Result<SectionTable> {
        SectionTable::new(self.sections.clone())
    }

    pub fn source_chain(&self) -> Result<SourceFallbackChain> {
        SourceFallbackChain::new(self.audio.sources.clone())
    }

    /// Configured loop mode as the controller understands it
    pub fn loop_mode(&self) -> LoopMode {
        match self.audio.loop_mode {
            LoopModeSetting::Native => LoopMode::Native,
            LoopModeSetting::Soft => LoopMode::soft(self.audio.soft_from, self.audio.soft_to),
            LoopModeSetting::Off => LoopMode::Off,
        }
    }
}

/// Session store location
///
/// Priority: explicit argument, then `DOORWAY_SESSION_STORE`, then the
/// platform data directory. None when no location can be determined, in
/// which case the session stays in memory.
pub fn session_store_path(explicit: Option<&Path>) -> Option<PathBuf> {
    resolve_store_path(
        explicit,
        std::env::var(ENV_SESSION_STORE).ok(),
        dirs::data_local_dir(),
    )
}

fn resolve_store_path(
    explicit: Option<&Path>,
    from_env: Option<String>,
    data_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = from_env.filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(value.trim()));
    }
    match data_dir {
        Some(dir) => Some(dir.join("doorway").join("session.json")),
        None => {
            warn!("No data directory available, session will not be persisted");
            None
        }
    }
}
