//! Integration tests for the pipeline module.
//!
//! These tests verify end-to-end pipeline behavior including:
//! - Empty and nonexistent photo roots
//! - Hashing, thumbnail generation and cache warm-up across runs
//! - Per-item failure isolation and the one-event-per-photo contract

use assert_fs::prelude::*;
use gallery_indexer::core::cache::SqliteStore;
use gallery_indexer::core::catalog::{stable_id, CatalogConfig, FsCatalog};
use gallery_indexer::core::pipeline::{Pipeline, ResultCode};
use gallery_indexer::events::{Event, EventChannel, ProcessEvent};
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Bytes of a minimal valid 1x1 PNG image
fn tiny_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG header
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
        0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8, 0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC,
        0xCC, 0x59, 0xE7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Create a minimal valid PNG image on disk
fn create_test_png(path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&tiny_png())?;
    Ok(())
}

fn build_pipeline(root: &Path, cache_db: &Path, thumb_dir: &Path) -> Pipeline {
    Pipeline::builder()
        .catalog(Box::new(FsCatalog::new(CatalogConfig::new(root))))
        .store(Arc::new(SqliteStore::open(cache_db).unwrap()))
        .thumb_dir(thumb_dir)
        .build()
        .unwrap()
}

#[test]
fn pipeline_handles_empty_directory() {
    let photos = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    let pipeline = build_pipeline(
        photos.path(),
        &state.path().join("gallery.db"),
        &state.path().join("thumbs"),
    );

    let outcome = pipeline.run().unwrap();

    assert_eq!(outcome.code, ResultCode::Empty);
    assert_eq!(outcome.total_photos, 0);
}

#[test]
fn pipeline_handles_nonexistent_root() {
    let state = TempDir::new().unwrap();

    let pipeline = build_pipeline(
        &PathBuf::from("/nonexistent/path/that/does/not/exist"),
        &state.path().join("gallery.db"),
        &state.path().join("thumbs"),
    );

    // A missing root is a real enumeration error, not an empty catalog
    assert!(pipeline.run().is_err());
}

#[test]
fn pipeline_hashes_and_thumbnails_a_photo() {
    let photos = assert_fs::TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    let img = photos.child("photo.png");
    img.write_binary(&tiny_png()).unwrap();

    let thumb_dir = state.path().join("thumbs");
    let pipeline = build_pipeline(photos.path(), &state.path().join("gallery.db"), &thumb_dir);

    let outcome = pipeline.run().unwrap();

    assert_eq!(outcome.code, ResultCode::Success);
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.skipped, 0);

    let all = outcome.albums.all_photos.unwrap();
    let photo = &all.photos[0];
    assert_eq!(photo.hash.len(), 32);

    // The generated thumbnail landed in the thumbnail cache directory
    let id = stable_id(&img.path().to_string_lossy());
    let thumb_path = thumb_dir.join(format!("thumb_{id}.jpg"));
    assert!(predicate::path::is_file().eval(&thumb_path));
    assert_eq!(photo.thumb_ref, thumb_path.to_string_lossy());
}

#[test]
fn pipeline_hashes_undecodable_files_without_thumbnails() {
    let photos = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    // Readable bytes that no image decoder accepts: the hash must still
    // be computed, the thumbnail degrades to empty
    let corrupt_path = photos.path().join("corrupt.jpg");
    let mut file = File::create(&corrupt_path).unwrap();
    file.write_all(b"this is not a valid image file").unwrap();
    drop(file);

    let pipeline = build_pipeline(
        photos.path(),
        &state.path().join("gallery.db"),
        &state.path().join("thumbs"),
    );

    let outcome = pipeline.run().unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.skipped, 0);

    let all = outcome.albums.all_photos.unwrap();
    assert_eq!(all.photos[0].hash.len(), 32);
    assert!(all.photos[0].thumb_ref.is_empty());
}

#[test]
fn second_run_is_served_from_the_cache() {
    let photos = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    create_test_png(&photos.path().join("a.png")).unwrap();
    create_test_png(&photos.path().join("b.png")).unwrap();

    let cache_db = state.path().join("gallery.db");
    let thumb_dir = state.path().join("thumbs");

    let first = build_pipeline(photos.path(), &cache_db, &thumb_dir)
        .run()
        .unwrap();
    assert_eq!(first.cache_hits, 0);

    let second = build_pipeline(photos.path(), &cache_db, &thumb_dir)
        .run()
        .unwrap();
    assert_eq!(second.cache_hits, 2);

    // Hashes are identical across runs
    let hashes = |outcome: &gallery_indexer::core::pipeline::PipelineOutcome| -> Vec<String> {
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

#[test]
fn identical_files_share_a_hash() {
    let photos = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    create_test_png(&photos.path().join("original.png")).unwrap();
    create_test_png(&photos.path().join("copy.png")).unwrap();

    let pipeline = build_pipeline(
        photos.path(),
        &state.path().join("gallery.db"),
        &state.path().join("thumbs"),
    );

    let outcome = pipeline.run().unwrap();
    let all = outcome.albums.all_photos.unwrap();

    assert_eq!(all.photos.len(), 2);
    assert_eq!(all.photos[0].hash, all.photos[1].hash);
    assert_ne!(all.photos[0].id, all.photos[1].id);
}

#[test]
fn every_photo_produces_exactly_one_event() {
    let photos = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    create_test_png(&photos.path().join("a.png")).unwrap();
    create_test_png(&photos.path().join("b.png")).unwrap();
    create_test_png(&photos.path().join("c.png")).unwrap();

    let pipeline = build_pipeline(
        photos.path(),
        &state.path().join("gallery.db"),
        &state.path().join("thumbs"),
    );

    let (sender, receiver) = EventChannel::new();
    let outcome = pipeline.run_with_events(&sender).unwrap();
    drop(sender);

    let mut per_photo_events = 0;
    for event in receiver.iter() {
        if let Event::Process(
            ProcessEvent::PhotoReady { .. } | ProcessEvent::PhotoSkipped { .. },
        ) = event
        {
            per_photo_events += 1;
        }
    }

    assert_eq!(per_photo_events, outcome.total_photos);
    assert_eq!(outcome.total_photos, 3);
}
