use std::io;
use std::path::PathBuf;

use thiserror::Error;

// Represents an error that happened while loading documents or writing a report.
// Irregular bibliography content is never an error; it only thins out the counts.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("File '{}' not found.", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(feature = "serde_json")]
    #[error("failed to serialize statistics: {0}")]
    Json(#[from] serde_json::Error),
}

impl StatsError {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::InputNotFound(path.into());
        }
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StatsError>;
