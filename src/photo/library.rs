use async_trait::async_trait;
use std::io::ErrorKind;

use super::error::FetchError;
use super::{PhotoLibrary, PhotoReference};

/// Photo library backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPhotoLibrary;

#[async_trait]
impl PhotoLibrary for FsPhotoLibrary {
    async fn fetch(&self, photo: &PhotoReference) -> Result<Vec<u8>, FetchError> {
        let path = photo.path();

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FetchError::NotFound(path.to_path_buf()),
            _ => FetchError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        if bytes.is_empty() {
            return Err(FetchError::Empty(path.to_path_buf()));
        }

        tracing::debug!(photo = %photo.id(), bytes = bytes.len(), "fetched photo");
        Ok(bytes)
    }
}
