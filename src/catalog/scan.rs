use std::path::{Path, PathBuf};

use rand::{Rng, seq::SliceRandom};
use walkdir::WalkDir;

use crate::{
    config::settings::CatalogOrder,
    foundation::error::{SlideError, SlideResult},
};

/// Still-image extensions, lowercase and without the dot.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];
/// Video extensions, lowercase and without the dot.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

/// Kind of a catalog entry, derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image held for `image_duration`.
    Image,
    /// Video clip played at its native length.
    Video,
}

impl MediaKind {
    /// Classify a path by extension (case-insensitive). `None` for unsupported files.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// One file in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MediaItem {
    /// File location.
    pub path: PathBuf,
    /// Image or video.
    pub kind: MediaKind,
}

/// Ordered list of media for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaCatalog {
    items: Vec<MediaItem>,
}

impl MediaCatalog {
    /// Build a catalog from pre-classified items.
    pub fn from_items(items: Vec<MediaItem>) -> Self {
        Self { items }
    }

    /// Items in play order.
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` when the catalog has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Walk `dir` recursively and collect supported media.
///
/// Unsupported extensions are skipped. With `shuffle` the order is a uniform permutation
/// drawn from `rng`; otherwise `order` decides between raw traversal order and a path sort.
/// Fails with [`SlideError::EmptyCatalog`] when nothing matches.
#[tracing::instrument(skip(rng))]
pub fn scan<R: Rng + ?Sized>(
    dir: &Path,
    shuffle: bool,
    order: CatalogOrder,
    rng: &mut R,
) -> SlideResult<MediaCatalog> {
    let mut items = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                if e.depth() == 0 {
                    return Err(SlideError::invalid_settings(format!(
                        "cannot read media directory '{}': {e}",
                        dir.display()
                    )));
                }
                tracing::warn!(error = %e, "skipping unreadable catalog entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(kind) = MediaKind::from_path(entry.path()) {
            items.push(MediaItem {
                path: entry.into_path(),
                kind,
            });
        }
    }

    if items.is_empty() {
        return Err(SlideError::EmptyCatalog {
            dir: dir.to_path_buf(),
        });
    }

    if shuffle {
        items.shuffle(rng);
    } else if order == CatalogOrder::Sorted {
        items.sort_by(|a, b| a.path.cmp(&b.path));
    }

    tracing::debug!(count = items.len(), "catalog scanned");
    Ok(MediaCatalog { items })
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/scan.rs"]
mod tests;
