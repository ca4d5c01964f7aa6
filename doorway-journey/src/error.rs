//! Error types for doorway-journey
//!
//! Only construction and configuration paths return these. Runtime host
//! failures (blocked autoplay, source load errors, storage failures) are
//! absorbed by the component that sees them and turned into state.

use thiserror::Error;

/// Main error type for doorway-journey
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Section table errors (duplicate ids, empty table)
    #[error("Invalid section table: {0}")]
    InvalidSections(String),

    /// Audio source chain errors
    #[error("Invalid audio sources: {0}")]
    InvalidSources(String),

    /// Key-value store errors (always swallowed by the session)
    #[error("Store error: {0}")]
    Store(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decode errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience Result type using doorway-journey Error
pub type Result<T> = std::result::Result<T, Error>;
