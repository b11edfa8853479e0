/// Photo access module
///
/// This module holds the capabilities the state tree depends on but does
/// not own:
/// - Photo references handed out by the picker (picker.rs)
/// - Fetching the raw bytes of a photo (library.rs)
/// - Decoding bytes into something the UI can display (decode.rs)

pub mod decode;
pub mod error;
pub mod library;
pub mod picker;

use async_trait::async_trait;
use iced::widget::image::Handle;
use std::fmt;
use std::path::{Path, PathBuf};

use error::{DecodeError, FetchError};

/// Stable identifier of a library asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to one photo, as handed out by the picker.
///
/// Immutable once created. The `path` is what the photo library needs to
/// fetch the bytes; everything else keys off `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoReference {
    id: PhotoId,
    path: PathBuf,
}

impl PhotoReference {
    pub fn new(id: PhotoId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    /// Build a reference for a file on disk.
    /// The identifier is the canonical path so the same file picked twice
    /// (through different relative paths) maps to one id.
    ///
    /// Touches the filesystem; async callers go through
    /// `picker::resolve_paths`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let canonical = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        let id = PhotoId::new(canonical.to_string_lossy().to_string());
        Self::new(id, canonical)
    }

    pub fn id(&self) -> &PhotoId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filename only (e.g., "IMG_0001.jpg"), used as the row title
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A decoded, display-ready image
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub handle: Handle,
}

impl PartialEq for DecodedImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.handle.id() == other.handle.id()
    }
}

/// Photo-access capability: fetch the raw bytes behind a reference
#[async_trait]
pub trait PhotoLibrary: Send + Sync {
    async fn fetch(&self, photo: &PhotoReference) -> Result<Vec<u8>, FetchError>;
}

/// Image decode capability: bytes in, displayable image out.
/// Called on a blocking worker thread.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;
}
