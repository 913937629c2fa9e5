//! Pipeline execution implementation.

use crate::core::cache::{InMemoryStore, KvStore};
use crate::core::catalog::{build_albums, DeviceAlbums, MediaCatalog, Photo};
use crate::core::processor::{PhotoProcessor, Processed};
use crate::core::source::{ByteSource, FsByteSource};
use crate::core::thumbnail::{DirThumbnailIndex, ThumbnailIndex, ThumbnailResolver};
use crate::error::{CatalogError, GalleryError};
use crate::events::{
    null_sender, CatalogEvent, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
    ProcessEvent, ProcessProgress,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Terminal state of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultCode {
    /// Photos were enumerated and streamed
    Success,
    /// The catalog enumerated zero photos; a valid outcome, not an error
    Empty,
    /// Catalog access was denied; re-request access and restart the run
    PermissionDenied,
}

/// Result of pipeline execution
///
/// The album payload is always present; for `Empty` and
/// `PermissionDenied` it is explicitly empty so consumers can treat
/// every outcome uniformly.
#[derive(Debug, Serialize)]
pub struct PipelineOutcome {
    /// Terminal state of the run
    pub code: ResultCode,
    /// Album collection with hashes and thumbnails filled in
    pub albums: DeviceAlbums,
    /// Total photos enumerated
    pub total_photos: usize,
    /// Photos processed successfully
    pub processed: usize,
    /// Photos skipped due to per-item failures
    pub skipped: usize,
    /// Hash cache hits
    pub cache_hits: usize,
    /// Whether the run was cancelled before completing
    pub cancelled: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineOutcome {
    fn terminal(code: ResultCode, duration_ms: u64) -> Self {
        Self {
            code,
            albums: DeviceAlbums::empty(),
            total_photos: 0,
            processed: 0,
            skipped: 0,
            cache_hits: 0,
            cancelled: false,
            duration_ms,
        }
    }
}

/// Builder for the indexing pipeline
pub struct PipelineBuilder {
    catalog: Option<Box<dyn MediaCatalog>>,
    store: Option<Arc<dyn KvStore>>,
    source: Option<Arc<dyn ByteSource>>,
    index: Option<Arc<dyn ThumbnailIndex>>,
    thumb_dir: Option<PathBuf>,
    cancel: Option<Arc<AtomicBool>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            catalog: None,
            store: None,
            source: None,
            index: None,
            thumb_dir: None,
            cancel: None,
        }
    }

    /// Set the media catalog to enumerate (required)
    pub fn catalog(mut self, catalog: Box<dyn MediaCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the persistent store (defaults to in-memory)
    pub fn store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the byte source (defaults to the filesystem)
    pub fn byte_source(mut self, source: Arc<dyn ByteSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the framework thumbnail index (defaults to the thumbnail
    /// cache directory itself)
    pub fn thumbnail_index(mut self, index: Arc<dyn ThumbnailIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the directory generated thumbnails are written to
    pub fn thumb_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.thumb_dir = Some(dir.into());
        self
    }

    /// Share a cancellation flag with the consumer
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline, GalleryError> {
        let catalog = self
            .catalog
            .ok_or_else(|| GalleryError::Config("pipeline requires a catalog".to_string()))?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let source = self.source.unwrap_or_else(|| Arc::new(FsByteSource::new()));
        let thumb_dir = self
            .thumb_dir
            .unwrap_or_else(|| std::env::temp_dir().join("gallery-indexer"));
        let index = self
            .index
            .unwrap_or_else(|| Arc::new(DirThumbnailIndex::new(&thumb_dir)));

        let resolver = ThumbnailResolver::new(store.clone(), index, thumb_dir);
        let processor = PhotoProcessor::new(store, source, resolver);

        Ok(Pipeline {
            catalog,
            processor,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The indexing pipeline
pub struct Pipeline {
    catalog: Box<dyn MediaCatalog>,
    processor: PhotoProcessor,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The flag a consumer sets to cancel the run.
    ///
    /// Cancellation stops new photos from being submitted; in-flight
    /// photos finish normally.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineOutcome, GalleryError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineOutcome, GalleryError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Enumerating,
        }));
        events.send(Event::Catalog(CatalogEvent::Started));

        let photos = match self.catalog.enumerate() {
            Ok(photos) => photos,
            Err(CatalogError::PermissionDenied { path }) => {
                tracing::warn!(path = %path.display(), "catalog access denied");
                events.send(Event::Pipeline(PipelineEvent::PermissionDenied));
                return Ok(PipelineOutcome::terminal(
                    ResultCode::PermissionDenied,
                    start_time.elapsed().as_millis() as u64,
                ));
            }
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        let total_photos = photos.len();
        let camera_dir = self.catalog.camera_dir().map(|p| p.to_path_buf());

        if photos.is_empty() {
            events.send(Event::Catalog(CatalogEvent::Completed {
                total_photos: 0,
                total_albums: 0,
            }));
            events.send(Event::Pipeline(PipelineEvent::Completed {
                summary: PipelineSummary {
                    total_photos: 0,
                    processed: 0,
                    skipped: 0,
                    cache_hits: 0,
                    duration_ms: start_time.elapsed().as_millis() as u64,
                },
            }));
            return Ok(PipelineOutcome::terminal(
                ResultCode::Empty,
                start_time.elapsed().as_millis() as u64,
            ));
        }

        let total_albums = photos
            .iter()
            .map(|p| p.bucket_id)
            .collect::<std::collections::HashSet<_>>()
            .len();
        events.send(Event::Catalog(CatalogEvent::Completed {
            total_photos,
            total_albums,
        }));

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Streaming,
        }));
        events.send(Event::Process(ProcessEvent::Started {
            total: total_photos,
        }));

        let completed = AtomicUsize::new(0);
        let cache_hits = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);

        // One slot per worker; results stay index-aligned with the input
        // so the final album collection keeps catalog order.
        let results: Vec<Option<Photo>> = photos
            .par_iter()
            .map(|photo| {
                if self.cancel.load(Ordering::SeqCst) {
                    return None;
                }

                match self.processor.process(photo) {
                    Ok(Processed { photo, cache_hit }) => {
                        if cache_hit {
                            cache_hits.fetch_add(1, Ordering::SeqCst);
                            events.send(Event::Process(ProcessEvent::CacheHit { id: photo.id }));
                        }

                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        events.send(Event::Process(ProcessEvent::PhotoReady {
                            photo: photo.clone(),
                        }));
                        events.send(Event::Process(ProcessEvent::Progress(ProcessProgress {
                            completed: done,
                            total: total_photos,
                            cache_hits: cache_hits.load(Ordering::SeqCst),
                        })));

                        Some(photo)
                    }
                    Err(e) => {
                        tracing::warn!(id = photo.id, error = %e, "skipping photo");
                        skipped.fetch_add(1, Ordering::SeqCst);

                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        events.send(Event::Process(ProcessEvent::PhotoSkipped {
                            id: photo.id,
                            message: e.to_string(),
                        }));
                        events.send(Event::Process(ProcessEvent::Progress(ProcessProgress {
                            completed: done,
                            total: total_photos,
                            cache_hits: cache_hits.load(Ordering::SeqCst),
                        })));

                        None
                    }
                }
            })
            .collect();

        // Carry forward the updated copies; skipped or unprocessed photos
        // keep their original (hashless) record.
        let final_photos: Vec<Photo> = photos
            .iter()
            .zip(results)
            .map(|(original, processed)| processed.unwrap_or_else(|| original.clone()))
            .collect();

        let albums = build_albums(&final_photos, camera_dir.as_deref());

        let cancelled = self.cancel.load(Ordering::SeqCst);
        let skipped = skipped.load(Ordering::SeqCst);
        let processed = completed.load(Ordering::SeqCst) - skipped;
        let cache_hits = cache_hits.load(Ordering::SeqCst);
        let duration_ms = start_time.elapsed().as_millis() as u64;

        if cancelled {
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
        } else {
            events.send(Event::Process(ProcessEvent::Completed {
                processed,
                skipped,
                cache_hits,
            }));
            events.send(Event::Pipeline(PipelineEvent::Completed {
                summary: PipelineSummary {
                    total_photos,
                    processed,
                    skipped,
                    cache_hits,
                    duration_ms,
                },
            }));
        }

        Ok(PipelineOutcome {
            code: ResultCode::Success,
            albums,
            total_photos,
            processed,
            skipped,
            cache_hits,
            cancelled,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{PhotoSource, ALL_PHOTOS_BUCKET_ID};
    use crate::error::ProcessError;
    use crate::events::EventChannel;
    use std::path::Path;

    /// Catalog serving a fixed photo list
    struct StaticCatalog {
        photos: Vec<Photo>,
    }

    impl MediaCatalog for StaticCatalog {
        fn enumerate(&self) -> Result<Vec<Photo>, CatalogError> {
            Ok(self.photos.clone())
        }
    }

    /// Catalog that always denies access
    struct DeniedCatalog;

    impl MediaCatalog for DeniedCatalog {
        fn enumerate(&self) -> Result<Vec<Photo>, CatalogError> {
            Err(CatalogError::PermissionDenied {
                path: PathBuf::from("/photos"),
            })
        }
    }

    /// Byte source where chosen photo ids fail to read
    struct SelectiveSource {
        failing_ids: Vec<i64>,
    }

    impl ByteSource for SelectiveSource {
        fn read_all(&self, photo: &Photo) -> Result<Vec<u8>, ProcessError> {
            if self.failing_ids.contains(&photo.id) {
                Err(ProcessError::ReadBytes {
                    reference: photo.source.reference(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "vanished"),
                })
            } else {
                Ok(format!("content of {}", photo.id).into_bytes())
            }
        }
    }

    fn photo(id: i64) -> Photo {
        Photo {
            id,
            bucket_id: 5,
            bucket_name: "Camera".to_string(),
            date_taken: 1000 + id,
            source: PhotoSource::File(PathBuf::from(format!("/photos/{id}.jpg"))),
            size: 10,
            orientation: 0,
            hash: String::new(),
            thumb_ref: String::new(),
        }
    }

    fn pipeline_over(
        photos: Vec<Photo>,
        failing_ids: Vec<i64>,
        thumb_dir: &Path,
    ) -> Pipeline {
        Pipeline::builder()
            .catalog(Box::new(StaticCatalog { photos }))
            .byte_source(Arc::new(SelectiveSource { failing_ids }))
            .thumb_dir(thumb_dir)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_without_catalog_is_a_config_error() {
        assert!(Pipeline::builder().build().is_err());
    }

    #[test]
    fn empty_catalog_is_a_valid_terminal_state() {
        let temp = tempfile::TempDir::new().unwrap();
        let pipeline = pipeline_over(Vec::new(), Vec::new(), temp.path());

        let outcome = pipeline.run().unwrap();

        assert_eq!(outcome.code, ResultCode::Empty);
        assert_eq!(outcome.albums.photo_count(), 0);
        assert_eq!(outcome.total_photos, 0);
    }

    #[test]
    fn denied_catalog_terminates_with_permission_denied() {
        let pipeline = Pipeline::builder()
            .catalog(Box::new(DeniedCatalog))
            .build()
            .unwrap();

        let outcome = pipeline.run().unwrap();

        assert_eq!(outcome.code, ResultCode::PermissionDenied);
        assert_eq!(outcome.albums.photo_count(), 0);
    }

    #[test]
    fn every_photo_produces_exactly_one_event() {
        let temp = tempfile::TempDir::new().unwrap();
        let photos: Vec<Photo> = (1..=5).map(photo).collect();
        let pipeline = pipeline_over(photos, vec![3], temp.path());

        let (sender, receiver) = EventChannel::new();
        let outcome = pipeline.run_with_events(&sender).unwrap();
        drop(sender);

        let mut ready = 0;
        let mut skipped = 0;
        for event in receiver.iter() {
            match event {
                Event::Process(ProcessEvent::PhotoReady { .. }) => ready += 1,
                Event::Process(ProcessEvent::PhotoSkipped { .. }) => skipped += 1,
                _ => {}
            }
        }

        assert_eq!(ready + skipped, 5);
        assert_eq!(skipped, 1);
        assert_eq!(outcome.processed, 4);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn one_failing_photo_does_not_stop_the_run() {
        let temp = tempfile::TempDir::new().unwrap();
        let photos: Vec<Photo> = (1..=4).map(photo).collect();
        let pipeline = pipeline_over(photos, vec![2], temp.path());

        let outcome = pipeline.run().unwrap();

        assert_eq!(outcome.code, ResultCode::Success);
        assert_eq!(outcome.processed, 3);
        assert_eq!(outcome.skipped, 1);

        // The other photos all got hashes
        let all = outcome.albums.all_photos.unwrap();
        let hashed = all.photos.iter().filter(|p| !p.hash.is_empty()).count();
        assert_eq!(hashed, 3);
    }

    #[test]
    fn progress_reaches_the_total() {
        let temp = tempfile::TempDir::new().unwrap();
        let photos: Vec<Photo> = (1..=3).map(photo).collect();
        let pipeline = pipeline_over(photos, Vec::new(), temp.path());

        let (sender, receiver) = EventChannel::new();
        pipeline.run_with_events(&sender).unwrap();
        drop(sender);

        let max_completed = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Process(ProcessEvent::Progress(p)) => Some(p.completed),
                _ => None,
            })
            .max();

        assert_eq!(max_completed, Some(3));
    }

    #[test]
    fn outcome_albums_carry_hashes_forward() {
        let temp = tempfile::TempDir::new().unwrap();
        let photos: Vec<Photo> = (1..=2).map(photo).collect();
        let pipeline = pipeline_over(photos, Vec::new(), temp.path());

        let outcome = pipeline.run().unwrap();

        let all = outcome.albums.all_photos.unwrap();
        assert_eq!(all.bucket_id, ALL_PHOTOS_BUCKET_ID);
        assert!(all.photos.iter().all(|p| !p.hash.is_empty()));
    }

    #[test]
    fn cancelled_run_reports_cancellation() {
        let temp = tempfile::TempDir::new().unwrap();
        let photos: Vec<Photo> = (1..=8).map(photo).collect();
        let pipeline = pipeline_over(photos, Vec::new(), temp.path());

        // Cancel before the run starts; no photo should be submitted
        pipeline.cancel_handle().store(true, Ordering::SeqCst);

        let outcome = pipeline.run().unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.processed, 0);
    }

    #[test]
    fn warm_cache_makes_second_run_all_hits() {
        let temp = tempfile::TempDir::new().unwrap();
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let photos: Vec<Photo> = (1..=3).map(photo).collect();

        let build = |store: Arc<dyn KvStore>| {
            Pipeline::builder()
                .catalog(Box::new(StaticCatalog {
                    photos: photos.clone(),
                }))
                .byte_source(Arc::new(SelectiveSource {
                    failing_ids: Vec::new(),
                }))
                .store(store)
                .thumb_dir(temp.path())
                .build()
                .unwrap()
        };

        let first = build(store.clone()).run().unwrap();
        assert_eq!(first.cache_hits, 0);

        let second = build(store).run().unwrap();
        assert_eq!(second.cache_hits, 3);

        // Hashes are unchanged between runs
        let hashes = |outcome: &PipelineOutcome| -> Vec<String> {
            outcome
                .albums
                .all_photos
                .as_ref()
                .unwrap()
                .photos
                .iter()
                .map(|p| p.hash.clone())
                .collect()
        };
        assert_eq!(hashes(&first), hashes(&second));
    }
}
