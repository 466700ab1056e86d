//! Shared test utilities for the picshelf test suite.
//!
//! Provides fixture builders for source trees, synthetic JPEGs, and manifest
//! records so individual test modules stay focused on assertions.

use crate::manifest::PhotoRecord;
use crate::scan::SourceImage;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Write placeholder bytes at `path`, creating parent directories.
///
/// The scanner only checks extensions, so most tests don't need real pixels.
pub fn write_fake_image(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"fake image bytes").unwrap();
}

/// Encode a real JPEG with the given dimensions at `path`.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// Build a [`SourceImage`] for a file on disk (mtime read when present,
/// otherwise now).
pub fn source_image(abs_path: &Path, rel_path: &str) -> SourceImage {
    let segments: Vec<&str> = rel_path.split('/').collect();
    let gallery = segments.first().unwrap_or(&"gallery").to_string();
    let event = if segments.len() >= 3 {
        segments[1].to_string()
    } else {
        crate::scan::GENERAL_EVENT.to_string()
    };
    let modified = std::fs::metadata(abs_path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|_| SystemTime::now());

    SourceImage {
        abs_path: abs_path.to_path_buf(),
        rel_path: rel_path.to_string(),
        gallery,
        event,
        modified,
    }
}

/// Build a [`PhotoRecord`] for `rel_path` dated `secs` after the epoch.
pub fn photo_record(rel_path: &str, secs: u64) -> PhotoRecord {
    let rel_jpg = Path::new(rel_path)
        .with_extension("jpg")
        .to_string_lossy()
        .into_owned();
    let filename = rel_path.rsplit('/').next().unwrap_or(rel_path);

    PhotoRecord {
        original: format!("/images/original/{rel_path}"),
        thumbnail: format!("/images/thumbnails/{rel_jpg}"),
        medium: format!("/images/medium/{rel_jpg}"),
        title: crate::naming::title_from_filename(filename),
        date: DateTime::<Utc>::from(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)),
        width: 64,
        height: 48,
        orientation: 1,
    }
}
