//! # Thumbnail Module
//!
//! Resolves a display thumbnail for a photo, cheapest source first:
//! an already-known reference, the local cache from a prior run, the
//! media framework's own thumbnail store, and only then manual
//! generation (bounds decode, sample-size computation, downscaled
//! decode, JPEG written to the cache directory).
//!
//! A photo that ends up without a thumbnail is a degraded-but-valid
//! outcome: the resolver gives up with an empty reference rather than
//! failing the photo.

mod decode;
pub mod sampler;

pub use sampler::{MAX_NUM_PIXELS_THUMBNAIL, TARGET_SIZE_MINI_THUMBNAIL};

use crate::core::cache::{thumb_key, KvStore};
use crate::core::catalog::Photo;
use crate::error::ThumbnailError;
use image::codecs::jpeg::JpegEncoder;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only view of a thumbnail store maintained outside this process
/// (the media framework's equivalent of a mini-thumbnail file).
pub trait ThumbnailIndex: Send + Sync {
    /// Best-effort lookup of a pre-existing thumbnail for a photo
    fn lookup(&self, photo_id: i64) -> Option<String>;
}

/// Framework index backed by a directory of `thumb_<id>.jpg` files
pub struct DirThumbnailIndex {
    dir: PathBuf,
}

impl DirThumbnailIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ThumbnailIndex for DirThumbnailIndex {
    fn lookup(&self, photo_id: i64) -> Option<String> {
        let path = self.dir.join(format!("thumb_{photo_id}.jpg"));
        path.is_file()
            .then(|| path.to_string_lossy().into_owned())
    }
}

/// Index for environments with no framework thumbnail store
pub struct NoThumbnailIndex;

impl ThumbnailIndex for NoThumbnailIndex {
    fn lookup(&self, _photo_id: i64) -> Option<String> {
        None
    }
}

/// Resolves thumbnails, consulting caches before generating
pub struct ThumbnailResolver {
    store: Arc<dyn KvStore>,
    index: Arc<dyn ThumbnailIndex>,
    thumb_dir: PathBuf,
}

impl ThumbnailResolver {
    pub fn new(
        store: Arc<dyn KvStore>,
        index: Arc<dyn ThumbnailIndex>,
        thumb_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            index,
            thumb_dir: thumb_dir.into(),
        }
    }

    /// Resolve a thumbnail reference for the photo.
    ///
    /// Returns an empty string when every path gives up; the caller is
    /// responsible for writing a non-empty result back into the cache.
    pub fn resolve(&self, photo: &Photo, bytes: &[u8]) -> Result<String, ThumbnailError> {
        if !photo.thumb_ref.is_empty() {
            return Ok(photo.thumb_ref.clone());
        }

        if let Some(cached) = self.lookup_local(photo.id) {
            return Ok(cached);
        }

        if let Some(existing) = self.index.lookup(photo.id) {
            tracing::debug!(id = photo.id, "thumbnail found in the framework store");
            return Ok(existing);
        }

        self.generate(photo.id, bytes)
    }

    /// Consult the local cache for a thumbnail persisted by a prior run.
    ///
    /// Covers thumbnails the framework store has since forgotten. Cache
    /// read failures count as misses.
    pub fn lookup_local(&self, photo_id: i64) -> Option<String> {
        match self.store.get(&thumb_key(photo_id)) {
            Ok(Some(cached)) if !cached.is_empty() => {
                tracing::debug!(id = photo_id, "thumbnail found in the local cache");
                Some(cached)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(id = photo_id, error = %e, "thumbnail cache read failed");
                None
            }
        }
    }

    /// Manually derive, downscale and persist a thumbnail.
    fn generate(&self, id: i64, bytes: &[u8]) -> Result<String, ThumbnailError> {
        let (width, height) = match decode::decode_bounds(bytes) {
            Some((w, h)) if w > 0 && h > 0 => (w, h),
            _ => {
                tracing::debug!(id, "bounds decode failed, giving up on a thumbnail");
                return Ok(String::new());
            }
        };

        let sample_size = sampler::compute_sample_size(
            width,
            height,
            Some(TARGET_SIZE_MINI_THUMBNAIL),
            Some(MAX_NUM_PIXELS_THUMBNAIL),
        );

        let image = decode::decode_image(bytes, id)?;
        let thumb = decode::downscale(&image, sample_size, id)?;
        tracing::debug!(
            id,
            width = thumb.width(),
            height = thumb.height(),
            "manually generated thumbnail"
        );

        let path = self.thumb_dir.join(format!("thumb_{id}.jpg"));
        match self.save_jpeg(&thumb, &path, id) {
            Ok(()) => Ok(path.to_string_lossy().into_owned()),
            Err(e) => {
                // Not fatal: the photo just goes without a thumbnail
                tracing::warn!(id, error = %e, "failed to save thumbnail to the local cache");
                Ok(String::new())
            }
        }
    }

    fn save_jpeg(
        &self,
        thumb: &image::DynamicImage,
        path: &Path,
        id: i64,
    ) -> Result<(), ThumbnailError> {
        fs::create_dir_all(&self.thumb_dir).map_err(|e| ThumbnailError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file = File::create(path).map_err(|e| ThumbnailError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        thumb
            .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, 100))
            .map_err(|e| ThumbnailError::Encode {
                id,
                reason: e.to_string(),
            })
    }
}
