//! # Error Module
//!
//! User-friendly error types for the gallery indexer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, photo ids, what went wrong
//! - **Keep failures local** - only catalog-level errors end a run; anything
//!   that happens while processing one photo is recovered per item

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while enumerating the media catalog
///
/// These are the only errors that terminate a run: a denied root is
/// unrecoverable without the consumer re-requesting access.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Photo root not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while processing a single photo
///
/// The pipeline catches these, skips the photo and continues.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read photo bytes from {reference}: {source}")]
    ReadBytes {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported photo source reference: {reference}")]
    UnsupportedSource { reference: String },
}

/// Errors that occur while deriving a thumbnail
///
/// The processor catches these and leaves the thumbnail reference empty;
/// a missing thumbnail is a degraded outcome, never a skipped photo.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to decode photo {id}: {reason}")]
    Decode { id: i64, reason: String },

    #[error("Failed to write thumbnail {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode thumbnail for photo {id}: {reason}")]
    Encode { id: i64, reason: String },
}

/// Errors that occur with the hash/thumbnail cache
///
/// Treated as recoverable everywhere: a failed read is a miss, a failed
/// write means recomputation on the next run.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Cache corruption detected at {path}. Delete this file and try again.")]
    Corrupted { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, GalleryError>;
