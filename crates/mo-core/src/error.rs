//! Error types
//!
//! Only configuration loading is recoverable. Everything past validation is
//! either a simulation outcome (reported through the display port) or a
//! programming error that panics.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::GameConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
