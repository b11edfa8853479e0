/// Photo picker
///
/// Wraps the native file dialogs. The picker is configured for
/// multi-select, images only; picks are merged into the running selection
/// rather than replacing it, so the user can keep adding photos.

use rfd::AsyncFileDialog;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::PhotoReference;
use crate::config::AppConfig;

/// Show the native multi-select dialog, filtered to image files
pub async fn pick_photos(extensions: Vec<String>) -> Vec<PhotoReference> {
    let picked = AsyncFileDialog::new()
        .set_title("Select Photos")
        .add_filter("Images", extensions.as_slice())
        .pick_files()
        .await;

    match picked {
        Some(handles) => {
            let paths = handles
                .iter()
                .map(|handle| handle.path().to_path_buf())
                .collect();
            resolve_paths(paths).await
        }
        None => {
            tracing::debug!("photo picker dismissed");
            Vec::new()
        }
    }
}

/// Turn picked paths into references, keeping their order.
/// Canonicalizing hits the filesystem, so it runs on a blocking worker.
pub async fn resolve_paths(paths: Vec<PathBuf>) -> Vec<PhotoReference> {
    let resolved = tokio::task::spawn_blocking(move || {
        paths
            .into_iter()
            .map(PhotoReference::from_path)
            .collect::<Vec<_>>()
    })
    .await;

    match resolved {
        Ok(photos) => photos,
        Err(e) => {
            tracing::warn!(error = %e, "path resolution worker failed");
            Vec::new()
        }
    }
}

/// Show the native folder dialog and collect every supported image inside
pub async fn pick_folder(config: AppConfig) -> Vec<PhotoReference> {
    let Some(folder) = AsyncFileDialog::new()
        .set_title("Select Folder with Photos")
        .pick_folder()
        .await
    else {
        tracing::debug!("folder picker dismissed");
        return Vec::new();
    };

    let folder = folder.path().to_path_buf();

    // Directory traversal is blocking I/O
    let scan = tokio::task::spawn_blocking(move || scan_folder(&folder, &config)).await;
    match scan {
        Ok(photos) => photos,
        Err(e) => {
            tracing::warn!(error = %e, "folder scan worker failed");
            Vec::new()
        }
    }
}

/// Collect supported images below `folder`, sorted by path
pub fn scan_folder(folder: &Path, config: &AppConfig) -> Vec<PhotoReference> {
    tracing::info!(folder = %folder.display(), "scanning folder");

    let max_depth = if config.recursive_folders { usize::MAX } else { 1 };

    let mut paths: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && config.accepts(path))
        .collect();
    paths.sort();

    tracing::info!(count = paths.len(), "folder scan complete");
    paths.into_iter().map(PhotoReference::from_path).collect()
}

/// Merge newly picked photos into the current selection.
///
/// Existing photos keep their position, new photos are appended in pick
/// order, photos already selected are ignored, and the result is cut to
/// `limit` when one is configured.
pub fn merge_selection(
    current: &[PhotoReference],
    picked: Vec<PhotoReference>,
    limit: Option<usize>,
) -> Vec<PhotoReference> {
    let mut seen: HashSet<_> = current.iter().map(|photo| photo.id().clone()).collect();
    let mut merged = current.to_vec();

    for photo in picked {
        if seen.insert(photo.id().clone()) {
            merged.push(photo);
        }
    }

    if let Some(limit) = limit {
        if merged.len() > limit {
            tracing::info!(limit, dropped = merged.len() - limit, "selection limit reached");
            merged.truncate(limit);
        }
    }

    merged
}
