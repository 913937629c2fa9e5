//! # Catalog Module
//!
//! Enumerates the photos available on the device and groups them into
//! albums. The catalog is the only component that knows where photo
//! records come from; everything downstream sees `Photo` values.
//!
//! ## Example
//! ```rust,ignore
//! use gallery_indexer::core::catalog::{CatalogConfig, FsCatalog, MediaCatalog};
//!
//! let catalog = FsCatalog::new(CatalogConfig::new("/home/me/Pictures"));
//! let photos = catalog.enumerate()?;
//! ```

mod albums;
mod exif;
mod filter;
mod fs;

pub use albums::build_albums;
pub use filter::PhotoFilter;
pub use fs::{stable_id, CatalogConfig, FsCatalog};

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bucket id reserved for the implicit "all photos" album
pub const ALL_PHOTOS_BUCKET_ID: i64 = 0;

/// Where a photo's bytes live.
///
/// Direct filesystem paths and opaque provider references need different
/// read strategies; the enum tag carries that distinction to `ByteSource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoSource {
    /// A plain filesystem path, read directly
    File(PathBuf),
    /// An opaque content reference resolved by a provider (e.g. a URI)
    Provider(String),
}

impl PhotoSource {
    /// Display form of the reference, for logs and error messages
    pub fn reference(&self) -> String {
        match self {
            PhotoSource::File(path) => path.to_string_lossy().into_owned(),
            PhotoSource::Provider(uri) => uri.clone(),
        }
    }

    /// The filesystem path, when this source has one
    pub fn path(&self) -> Option<&Path> {
        match self {
            PhotoSource::File(path) => Some(path),
            PhotoSource::Provider(_) => None,
        }
    }
}

/// One photo record produced by catalog enumeration.
///
/// `hash` and `thumb_ref` start empty and are filled in by the processor,
/// which returns an updated copy rather than mutating shared state. Once
/// non-empty they are never cleared within a record's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    /// Stable identity, unique within one enumeration
    pub id: i64,
    /// Grouping key, typically the source directory
    pub bucket_id: i64,
    /// Display name of the bucket
    pub bucket_name: String,
    /// Capture timestamp, milliseconds since the Unix epoch
    pub date_taken: i64,
    /// Where the bytes live
    pub source: PhotoSource,
    /// Byte size of the photo file
    pub size: u64,
    /// Rotation metadata in degrees: 0, 90, 180 or 270
    pub orientation: u16,
    /// Lowercase hex content hash; empty until computed
    pub hash: String,
    /// Reference to the cached thumbnail; empty until resolved
    pub thumb_ref: String,
}

/// An album: one bucket's photos in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    /// Bucket id; `ALL_PHOTOS_BUCKET_ID` for the implicit all-photos album
    pub bucket_id: i64,
    /// Display name
    pub name: String,
    /// The first photo encountered for this bucket
    pub cover: Photo,
    /// Photos in display order
    pub photos: Vec<Photo>,
}

impl Album {
    fn new(bucket_id: i64, name: impl Into<String>, cover: Photo) -> Self {
        Self {
            bucket_id,
            name: name.into(),
            cover,
            photos: Vec::new(),
        }
    }
}

/// The full album collection for one enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAlbums {
    /// Real albums; the camera bucket sorts to the front when present
    pub albums: Vec<Album>,
    /// The implicit album holding every photo, chronological ascending
    pub all_photos: Option<Album>,
    /// Bucket id of the detected camera album, -1 when absent
    pub camera_bucket_id: i64,
}

impl DeviceAlbums {
    /// The explicit empty collection, used for the empty and
    /// permission-denied pipeline outcomes so consumers never see an
    /// absent payload.
    pub fn empty() -> Self {
        Self {
            albums: Vec::new(),
            all_photos: None,
            camera_bucket_id: -1,
        }
    }

    /// Total number of photos across the collection
    pub fn photo_count(&self) -> usize {
        self.all_photos.as_ref().map_or(0, |a| a.photos.len())
    }
}

/// Trait for media catalogs
///
/// Implement this trait to enumerate photos from a different store
/// (or to inject fixtures in tests).
pub trait MediaCatalog: Send + Sync {
    /// Enumerate all photo records, reverse-chronological by capture time.
    ///
    /// Zero records is a valid, non-error outcome. Permission denial is
    /// distinguished so the pipeline can surface it as a terminal state.
    fn enumerate(&self) -> Result<Vec<Photo>, CatalogError>;

    /// Path prefix identifying the camera-output bucket, when known
    fn camera_dir(&self) -> Option<&Path> {
        None
    }
}
