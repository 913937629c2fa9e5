//! Event type definitions for progress reporting.

use crate::core::catalog::Photo;
use serde::{Deserialize, Serialize};

/// All events emitted by the indexing pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Catalog enumeration events
    Catalog(CatalogEvent),
    /// Per-photo processing events
    Process(ProcessEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during catalog enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CatalogEvent {
    /// Enumeration has started
    Started,
    /// Enumeration completed; per-photo processing begins next
    Completed {
        total_photos: usize,
        total_albums: usize,
    },
}

/// Events during per-photo processing
///
/// The delivery contract: exactly one `PhotoReady` or `PhotoSkipped` per
/// enumerated photo, each followed by a `Progress` update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessEvent {
    /// Processing has started
    Started { total: usize },
    /// A photo finished processing; hash and (best-effort) thumbnail set
    PhotoReady { photo: Photo },
    /// A photo failed and was skipped; the run continues
    PhotoSkipped { id: i64, message: String },
    /// A photo's hash was served from the cache (no byte read needed)
    CacheHit { id: i64 },
    /// Progress update, emitted once per completed-or-skipped photo
    Progress(ProcessProgress),
    /// Processing completed
    Completed {
        processed: usize,
        skipped: usize,
        cache_hits: usize,
    },
}

/// Progress counters during processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessProgress {
    /// Number of photos completed or skipped so far
    pub completed: usize,
    /// Total number of enumerated photos
    pub total: usize,
    /// Number of cache hits so far
    pub cache_hits: usize,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Catalog access was denied; the consumer must re-request access
    /// and restart the run
    PermissionDenied,
    /// Pipeline completed
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled before all photos were processed
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Enumerating,
    Streaming,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total photos enumerated
    pub total_photos: usize,
    /// Photos successfully processed
    pub processed: usize,
    /// Photos skipped due to per-item failures
    pub skipped: usize,
    /// Hash cache hits
    pub cache_hits: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Enumerating => write!(f, "Enumerating"),
            PipelinePhase::Streaming => write!(f, "Streaming"),
        }
    }
}
