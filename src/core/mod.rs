//! # Core Module
//!
//! The GUI-agnostic gallery indexing engine.
//!
//! ## Modules
//! - `catalog` - Enumerates photos from the media store and groups albums
//! - `cache` - Persists hashes and thumbnail references across runs
//! - `hasher` - Computes the MD5 content hash
//! - `source` - Reads full photo bytes from either source kind
//! - `thumbnail` - Resolves or derives a display thumbnail per photo
//! - `processor` - Per-photo unit of work (cache, hash, thumbnail)
//! - `pipeline` - Orchestrates the full workflow

pub mod cache;
pub mod catalog;
pub mod hasher;
pub mod pipeline;
pub mod processor;
pub mod source;
pub mod thumbnail;

// Re-export commonly used types
pub use catalog::{Album, DeviceAlbums, MediaCatalog, Photo, PhotoSource};
pub use pipeline::{Pipeline, PipelineOutcome, ResultCode};
pub use processor::PhotoProcessor;
