//! Error type for configuration loading and path recording.
//!
//! Tracing itself never fails: escaped, absorbed and exhausted rays are
//! ordinary outcomes, not errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced around the tracing core.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the config or writing recorded paths failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse {path}: {source}")]
    Config {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
