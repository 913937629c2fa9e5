//! # Processor Module
//!
//! The per-photo unit of work: cache lookup, conditional hashing,
//! conditional thumbnail resolution, cache write-back.
//!
//! `process` is deterministic from the caller's perspective: given the
//! same cache state and the same bytes it always produces the same hash
//! and thumbnail fields. It returns an updated copy of the record so
//! workers never share mutable state.

use crate::core::cache::{hash_key, thumb_key, KvStore};
use crate::core::catalog::Photo;
use crate::core::hasher::md5_hex;
use crate::core::source::ByteSource;
use crate::core::thumbnail::ThumbnailResolver;
use crate::error::ProcessError;
use std::sync::Arc;

/// A processed photo plus where its hash came from
#[derive(Debug)]
pub struct Processed {
    /// The photo with hash and (best-effort) thumbnail populated
    pub photo: Photo,
    /// Whether the hash was served from the cache
    pub cache_hit: bool,
}

/// Runs the hash+thumbnail workflow for one photo at a time
pub struct PhotoProcessor {
    store: Arc<dyn KvStore>,
    source: Arc<dyn ByteSource>,
    resolver: ThumbnailResolver,
}

impl PhotoProcessor {
    pub fn new(
        store: Arc<dyn KvStore>,
        source: Arc<dyn ByteSource>,
        resolver: ThumbnailResolver,
    ) -> Self {
        Self {
            store,
            source,
            resolver,
        }
    }

    /// Process one photo: ensure its hash and thumbnail fields are
    /// populated, consulting and updating the cache.
    ///
    /// Byte-read failures propagate; the pipeline isolates them per item.
    /// Thumbnail failures never propagate - the photo just goes without.
    pub fn process(&self, photo: &Photo) -> Result<Processed, ProcessError> {
        let mut photo = photo.clone();

        let cached = match self.store.get(&hash_key(photo.id)) {
            Ok(value) => value,
            Err(e) => {
                // A failed read is a miss; recomputing is always correct
                tracing::warn!(id = photo.id, error = %e, "hash cache read failed");
                None
            }
        };

        let cache_hit = cached.is_some();

        match cached {
            Some(hash) => {
                photo.hash = hash;
                if photo.thumb_ref.is_empty() {
                    // Cheap lookups first; only read bytes when a
                    // thumbnail actually has to be produced.
                    if let Some(cached_ref) = self.resolver.lookup_local(photo.id) {
                        photo.thumb_ref = cached_ref;
                    } else {
                        let bytes = self.source.read_all(&photo)?;
                        self.attach_thumbnail(&mut photo, &bytes);
                    }
                }
            }
            None => {
                let bytes = self.source.read_all(&photo)?;

                if photo.thumb_ref.is_empty() {
                    self.attach_thumbnail(&mut photo, &bytes);
                }

                photo.hash = md5_hex(&bytes);
                if let Err(e) = self.store.put(&hash_key(photo.id), &photo.hash) {
                    tracing::warn!(id = photo.id, error = %e, "hash cache write failed");
                }
            }
        }

        Ok(Processed { photo, cache_hit })
    }

    /// Best-effort thumbnail resolution plus cache write-back.
    fn attach_thumbnail(&self, photo: &mut Photo, bytes: &[u8]) {
        match self.resolver.resolve(photo, bytes) {
            Ok(thumb_ref) if !thumb_ref.is_empty() => {
                photo.thumb_ref = thumb_ref;
                if let Err(e) = self
                    .store
                    .put(&thumb_key(photo.id), &photo.thumb_ref)
                {
                    tracing::warn!(id = photo.id, error = %e, "thumbnail cache write failed");
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(id = photo.id, error = %e, "failed to generate a thumbnail");
            }
        }
    }
}
