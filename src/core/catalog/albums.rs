//! Album grouping.
//!
//! Groups an enumeration into per-bucket albums plus the implicit
//! all-photos album. Input order is the catalog's reverse-chronological
//! order, which is also each real album's display order; the all-photos
//! album alone is re-sorted chronologically ascending.

use super::{Album, DeviceAlbums, Photo, ALL_PHOTOS_BUCKET_ID};
use std::collections::HashMap;
use std::path::Path;

/// Group enumerated photos into the device album collection.
///
/// The camera bucket, identified by `camera_dir` path prefix, sorts to the
/// front of the album list. Each album's cover is the first photo
/// encountered for its bucket.
pub fn build_albums(photos: &[Photo], camera_dir: Option<&Path>) -> DeviceAlbums {
    let first = match photos.first() {
        Some(photo) => photo,
        None => return DeviceAlbums::empty(),
    };

    let mut all_photos = Album::new(ALL_PHOTOS_BUCKET_ID, "All Photos", first.clone());
    let mut albums: Vec<Album> = Vec::new();
    let mut index_by_bucket: HashMap<i64, usize> = HashMap::new();
    let mut camera_bucket_id = -1;

    for photo in photos {
        all_photos.photos.push(photo.clone());

        let slot = match index_by_bucket.get(&photo.bucket_id) {
            Some(&slot) => slot,
            None => {
                let album = Album::new(photo.bucket_id, photo.bucket_name.clone(), photo.clone());
                let is_camera = camera_bucket_id == -1
                    && camera_dir
                        .zip(photo.source.path())
                        .is_some_and(|(dir, path)| path.starts_with(dir));

                let slot = if is_camera {
                    camera_bucket_id = photo.bucket_id;
                    // Camera roll leads the album list
                    for index in index_by_bucket.values_mut() {
                        *index += 1;
                    }
                    albums.insert(0, album);
                    0
                } else {
                    albums.push(album);
                    albums.len() - 1
                };
                index_by_bucket.insert(photo.bucket_id, slot);
                slot
            }
        };

        albums[slot].photos.push(photo.clone());
    }

    // Oldest first, unlike every other album
    all_photos.photos.sort_by_key(|p| p.date_taken);

    DeviceAlbums {
        albums,
        all_photos: Some(all_photos),
        camera_bucket_id,
    }
}
