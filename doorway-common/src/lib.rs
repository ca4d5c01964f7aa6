//! # Doorway Common Library
//!
//! Shared code for the doorway journey crates including:
//! - Event types (JourneyEvent enum) and the EventBus
//! - Deploy-time configuration (engine URLs, build stamp)
//! - Build identification captured at compile time
//! - Clock-style time formatting for playback telemetry

pub mod build_info;
pub mod config;
pub mod error;
pub mod events;
pub mod human_time;

pub use build_info::BuildInfo;
pub use error::{Error, Result};
