//! # Source Module
//!
//! Reads a photo's full byte content. Direct filesystem paths and
//! provider-style references are unified behind one contract so the
//! processor never cares which kind it got.

use crate::core::catalog::{Photo, PhotoSource};
use crate::error::ProcessError;
use std::fs;
use std::path::Path;

/// Trait for reading a photo's full byte content
///
/// Read failures propagate to the caller; per-item isolation is the
/// pipeline's job, not this component's.
pub trait ByteSource: Send + Sync {
    /// Read all bytes of the photo's content
    fn read_all(&self, photo: &Photo) -> Result<Vec<u8>, ProcessError>;
}

/// Byte source backed by the local filesystem.
///
/// Handles direct paths and `file://` provider references; any other
/// provider scheme is unsupported here and must come from a dedicated
/// implementation.
pub struct FsByteSource;

impl FsByteSource {
    pub fn new() -> Self {
        Self
    }

    fn read_path(&self, path: &Path, reference: &str) -> Result<Vec<u8>, ProcessError> {
        fs::read(path).map_err(|e| ProcessError::ReadBytes {
            reference: reference.to_string(),
            source: e,
        })
    }
}

impl Default for FsByteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for FsByteSource {
    fn read_all(&self, photo: &Photo) -> Result<Vec<u8>, ProcessError> {
        match &photo.source {
            PhotoSource::File(path) => self.read_path(path, &photo.source.reference()),
            PhotoSource::Provider(uri) => match uri.strip_prefix("file://") {
                Some(path) => self.read_path(Path::new(path), uri),
                None => Err(ProcessError::UnsupportedSource {
                    reference: uri.clone(),
                }),
            },
        }
    }
}
