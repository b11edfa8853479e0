use std::path::PathBuf;
use thiserror::Error;

/// The photo bytes could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("photo not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("photo is empty: {0}")]
    Empty(PathBuf),
}

/// The bytes were retrieved but could not be turned into an image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported content type")]
    UnsupportedContentType,
    #[error("corrupt image data: {0}")]
    Corrupt(String),
}

/// Everything that can go wrong while loading one attachment.
/// All variants collapse to the same `failed` status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("decode worker failed: {0}")]
    Worker(String),
}
