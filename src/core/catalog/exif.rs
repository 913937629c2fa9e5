//! EXIF extraction for catalog records.
//!
//! The catalog only needs two fields out of EXIF: the capture timestamp
//! (DateTimeOriginal) and the orientation. Files without usable EXIF are
//! common; every failure path degrades to "no data" rather than an error.

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The EXIF fields a catalog record is built from
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifSummary {
    /// Capture time in milliseconds since the Unix epoch
    pub date_taken_ms: Option<i64>,
    /// Rotation in degrees: 0, 90, 180 or 270
    pub orientation: u16,
}

/// Read the capture time and orientation from a photo file.
pub fn read_summary(path: &Path) -> ExifSummary {
    let mut summary = ExifSummary::default();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return summary,
    };

    let mut bufreader = BufReader::new(&file);
    let exif_reader = match Reader::new().read_from_container(&mut bufreader) {
        Ok(r) => r,
        Err(_) => return summary,
    };

    if let Some(field) = exif_reader.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        if let Value::Ascii(ref vec) = field.value {
            if let Some(bytes) = vec.first() {
                if let Ok(s) = std::str::from_utf8(bytes) {
                    // EXIF date format: "YYYY:MM:DD HH:MM:SS"
                    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
                        summary.date_taken_ms = Some(naive.and_utc().timestamp_millis());
                    }
                }
            }
        }
    }

    if let Some(field) = exif_reader.get_field(Tag::Orientation, In::PRIMARY) {
        if let Value::Short(ref vec) = field.value {
            summary.orientation = vec.first().copied().map(degrees_from_exif).unwrap_or(0);
        }
    }

    summary
}

/// Map the EXIF orientation code (1-8) to whole-degree rotation.
///
/// Mirrored variants collapse onto their rotation; unknown codes read as
/// upright.
fn degrees_from_exif(code: u16) -> u16 {
    match code {
        3 | 4 => 180,
        5 | 6 => 90,
        7 | 8 => 270,
        _ => 0,
    }
}
