//! Common error types for the doorway crates

use thiserror::Error;

/// Common result type for doorway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the doorway crates
#[derive(Error, Debug)]
pub enum Error {
    /// TOML parse error while reading a config file
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
