use std::path::PathBuf;

use thiserror::Error;

/// Letter data that cannot start a tracing session.
#[derive(Debug, Error)]
pub enum LetterError {
    #[error("letter `{name}` has no chunks")]
    NoChunks { name: String },

    #[error("letter `{name}` chunk {chunk} yields no segments ({points} points)")]
    DegenerateChunk {
        name: String,
        chunk: usize,
        points: usize,
    },

    #[error("letter `{name}` has an empty or inverted bounding box")]
    InvalidBounds { name: String },

    #[error("letter bank is empty")]
    EmptyBank,

    #[error("unknown letter: {0}")]
    UnknownLetter(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid letter json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config validation error: {0}")]
    Validation(String),
}
