//! Error types
//!
//! The simulation itself never fails; errors only arise at the edges
//! (loading configuration, using a session that was never opened).

use std::path::PathBuf;

use thiserror::Error;

/// Crate-level result alias
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error
#[derive(Debug, Error)]
pub enum Error {
    /// The session has no game state (not opened yet, or closed)
    #[error("game session is not initialized; call `open` first")]
    SessionNotInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure loading or validating a [`crate::GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
