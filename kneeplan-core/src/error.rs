/// Error types for planning geometry, configuration and landmark input
use std::path::PathBuf;

use crate::landmark::Landmark;

/// A degenerate geometric configuration.
///
/// Builders return this instead of producing a partially populated frame. The
/// planner logs it and treats the affected stage as absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("{what} has zero length")]
    ZeroLength { what: &'static str },
    #[error("{what} is not finite")]
    NonFinite { what: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LandmarkError {
    #[error("unknown landmark name {0:?}")]
    UnknownName(String),
    #[error("landmark {0} has non-finite coordinates")]
    NonFinite(Landmark),
    #[error("failed to read landmarks {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed landmark file: {0}")]
    Json(#[from] serde_json::Error),
}
