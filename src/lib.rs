//! # Gallery Indexer
//!
//! Scans a photo library, content-hashes every photo and caches a display
//! thumbnail for each one, so repeat scans are cheap and a viewer can show
//! results as they arrive.
//!
//! ## Core Philosophy
//! - **Never block the consumer** - enumeration and per-photo work run off
//!   the thread that receives results
//! - **One bad photo never kills a scan** - failures are isolated per item
//! - **Never redo work** - hashes and thumbnails persist across runs
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation
//! layers:
//! - `core` - catalog enumeration, hashing, thumbnails, the batch pipeline
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - user-friendly error types
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{GalleryError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
