//! Filesystem-backed catalog implementation using walkdir.

use super::{exif, MediaCatalog, Photo, PhotoFilter, PhotoSource};
use crate::error::CatalogError;
use md5::{Digest, Md5};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Configuration for the filesystem catalog
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Root of the photo library
    pub root: PathBuf,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Camera-output directory; photos under it form the camera album.
    /// Defaults to `<root>/DCIM/Camera`.
    pub camera_dir: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let camera_dir = Some(root.join("DCIM").join("Camera"));
        Self {
            root,
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
            extensions: None,
            camera_dir,
        }
    }
}

/// Derive a photo's stable identity from its source reference.
///
/// The identity must survive re-enumeration so cache keys written in one
/// run resolve in the next. Hashing the reference gives a deterministic
/// 63-bit id without any on-disk id assignment.
pub fn stable_id(reference: &str) -> i64 {
    let digest = Md5::digest(reference.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (i64::from_be_bytes(bytes)) & i64::MAX
}

/// Catalog implementation that walks a photo library on disk
pub struct FsCatalog {
    config: CatalogConfig,
    filter: PhotoFilter,
}

impl FsCatalog {
    /// Create a new catalog with the given configuration
    pub fn new(config: CatalogConfig) -> Self {
        let mut filter = PhotoFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    fn record_for(&self, path: &Path, metadata: &fs::Metadata) -> Photo {
        let reference = path.to_string_lossy();
        let summary = exif::read_summary(path);

        // EXIF capture time when present, file modification time otherwise
        let date_taken = summary.date_taken_ms.unwrap_or_else(|| {
            metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0)
        });

        let parent = path.parent().unwrap_or(Path::new(""));
        let bucket_name = parent
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Photo {
            id: stable_id(&reference),
            bucket_id: stable_id(&parent.to_string_lossy()),
            bucket_name,
            date_taken,
            source: PhotoSource::File(path.to_path_buf()),
            size: metadata.len(),
            orientation: summary.orientation,
            hash: String::new(),
            thumb_ref: String::new(),
        }
    }
}

impl MediaCatalog for FsCatalog {
    fn enumerate(&self) -> Result<Vec<Photo>, CatalogError> {
        let root = &self.config.root;

        // Root access failures are terminal; everything below the root is
        // handled per entry.
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(CatalogError::RootNotFound { path: root.clone() });
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(CatalogError::PermissionDenied { path: root.clone() });
            }
            Err(_) => {
                return Err(CatalogError::RootNotFound { path: root.clone() });
            }
        }

        let mut photos = Vec::new();

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                        && path == *root
                    {
                        return Err(CatalogError::PermissionDenied { path });
                    }
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();

            if path.is_dir() {
                // Skip hidden directories unless configured otherwise
                if !self.config.include_hidden {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        if name.starts_with('.') && path != root.as_path() {
                            continue;
                        }
                    }
                }
                continue;
            }

            if !self.filter.should_include(path) {
                continue;
            }

            match fs::metadata(path) {
                Ok(metadata) => photos.push(self.record_for(path, &metadata)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable photo");
                }
            }
        }

        // Reverse-chronological, path as a deterministic tie-break
        photos.sort_by(|a, b| {
            b.date_taken
                .cmp(&a.date_taken)
                .then_with(|| a.source.reference().cmp(&b.source.reference()))
        });

        Ok(photos)
    }

    fn camera_dir(&self) -> Option<&Path> {
        self.config.camera_dir.as_deref()
    }
}
