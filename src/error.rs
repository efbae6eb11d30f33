//! Error type shared by asset loading, configuration and pet construction.
//!
//! Per-tick code never returns errors; everything here happens at load or
//! spawn time, or at the render boundary where a failing pet is skipped.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PetError {
    /// The asset store was used before its load completed.
    #[error("assets are not loaded yet")]
    NotReady,

    /// A body set or part variant the pet needs does not exist.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("invalid path data at byte {position}: {reason}")]
    PathParse { position: usize, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("render failed: {0}")]
    Render(String),
}
