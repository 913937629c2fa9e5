//! # Pipeline Module
//!
//! Orchestrates the full indexing workflow: catalog enumeration, album
//! grouping, parallel per-photo processing, and completion-order result
//! emission.
//!
//! ## State machine
//! INIT → ENUMERATING → STREAMING → (DONE | EMPTY | PERMISSION_DENIED)
//!
//! One bad photo never aborts a run: per-item failures become skip
//! events and the run continues.
//!
//! ## Example
//! ```rust,ignore
//! let outcome = Pipeline::builder()
//!     .catalog(Box::new(FsCatalog::new(config)))
//!     .store(Arc::new(SqliteStore::open(&db_path)?))
//!     .thumb_dir(cache_dir.join("thumbs"))
//!     .build()
//!     .run_with_events(&sender)?;
//! ```

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineOutcome, ResultCode};
