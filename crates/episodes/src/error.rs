//! Error types for episode creation and training-data persistence.

use contextloom_core::BoxError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("Episode summarizer failed: {0}")]
    Summarizer(#[source] BoxError),

    #[error("Training data I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EpisodeError {
    /// Wrap an error raised by an [`EpisodeSummarizer`](crate::EpisodeSummarizer).
    pub fn summarizer(err: impl Into<BoxError>) -> Self {
        Self::Summarizer(err.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EpisodeError>;
