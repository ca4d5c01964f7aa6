//! Playback-related type definitions
//!
//! Supporting types for the audio controller's state and loop configuration.

use serde::{Deserialize, Serialize};

/// Playback state enumeration
///
/// Transitions: `Idle → Loading → Playing ⇄ Paused`, `Playing/Loading → Ended`,
/// any state `→ Error` on load failure, `Error → Loading` on retry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    Error,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Ended => write!(f, "ended"),
            PlaybackState::Error => write!(f, "error"),
        }
    }
}

/// Loop configuration
///
/// Native and soft looping are mutually exclusive by construction.
/// `Soft { to_seconds: 0.0 }` means "loop to end of track".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LoopMode {
    /// Media element's built-in whole-track repeat
    #[default]
    Native,
    /// Application-level segment repeat
    Soft { from_seconds: f64, to_seconds: f64 },
    /// No looping (ended playback triggers the manual restart failsafe)
    Off,
}

impl LoopMode {
    /// Build a soft loop, clamping negative/non-finite bounds to 0
    pub fn soft(from_seconds: f64, to_seconds: f64) -> Self {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        LoopMode::Soft {
            from_seconds: clean(from_seconds),
            to_seconds: clean(to_seconds),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, LoopMode::Native)
    }

    pub fn is_soft(&self) -> bool {
        matches!(self, LoopMode::Soft { .. })
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopMode::Native => write!(f, "native"),
            LoopMode::Soft {
                from_seconds,
                to_seconds,
            } => write!(f, "soft({}..{})", from_seconds, to_seconds),
            LoopMode::Off => write!(f, "off"),
        }
    }
}
