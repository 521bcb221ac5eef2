use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid preprocessed data: {0}")]
    Validation(String),

    #[error("Invalid score vectors: start has {start_len} scores, end has {end_len}")]
    InvalidScoreVector { start_len: usize, end_len: usize },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
