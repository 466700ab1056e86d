//! Manifest building and serialization.
//!
//! Stage 3 of the build pipeline. Photo records produced by the process stage
//! are folded into a gallery → event tree, sorted, summarized, and written as
//! pretty-printed JSON for the browser-side renderer to fetch.
//!
//! ## Canonical Schema
//!
//! The manifest uses one tagged shape per gallery rather than duck-typed
//! variants:
//!
//! - `"layout": "flat"` with an `images` array when every photo landed in the
//!   synthetic `general` event
//! - `"layout": "events"` with an `events` map otherwise
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "lastGenerated": "2026-08-06T12:00:00Z",
//!   "stats": { "totalImages": 9, "thumbnailSizeMB": "0.61", "mediumSizeMB": "3.20" },
//!   "galleries": {
//!     "nature": {
//!       "title": "Nature",
//!       "description": "3 photos",
//!       "layout": "flat",
//!       "images": [ { "original": "/images/original/nature/sample_1.jpg", ... } ]
//!     }
//!   }
//! }
//! ```
//!
//! ## Builder Semantics
//!
//! [`ManifestBuilder`] is a reducer: `builder.with(gallery, event, record)`
//! consumes and returns the builder, so the pipeline threads a single value
//! instead of mutating an ambient accumulator. Within an event, records are
//! keyed by relative path — a later record with the same path silently
//! replaces the earlier one. Galleries with zero photos never exist in the
//! builder, so they are omitted from the output by construction.
//!
//! The whole tree is rebuilt from the filesystem on every run; the JSON file
//! is never read back as a source of truth.

use crate::naming;
use crate::scan::GENERAL_EVENT;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Manifest location under the output root, fetched by the front end.
pub const MANIFEST_REL_PATH: &str = "js/gallery-config.json";

/// One processed photo.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhotoRecord {
    /// Site-absolute path of the original copy, e.g. `/images/original/nature/a.jpg`.
    pub original: String,
    /// Site-absolute path of the thumbnail variant.
    pub thumbnail: String,
    /// Site-absolute path of the medium variant.
    pub medium: String,
    /// Display title derived from the filename.
    pub title: String,
    /// Capture/modification date (source file mtime).
    pub date: DateTime<Utc>,
    /// Pixel width as stored (pre-rotation). 0 when the file could not be decoded.
    pub width: u32,
    /// Pixel height as stored (pre-rotation). 0 when the file could not be decoded.
    pub height: u32,
    /// EXIF orientation value (1 = normal).
    pub orientation: u32,
}

/// Second-level grouping within a gallery.
#[derive(Debug, Serialize)]
pub struct EventNode {
    pub title: String,
    pub description: String,
    pub photos: Vec<PhotoRecord>,
}

/// Top-level named collection of photos.
#[derive(Debug, Serialize)]
pub struct GalleryNode {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub layout: GalleryLayout,
}

/// Canonical tagged layout: flat photo list or nested events.
#[derive(Debug, Serialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum GalleryLayout {
    Flat { images: Vec<PhotoRecord> },
    Events { events: BTreeMap<String, EventNode> },
}

/// Aggregate statistics for the manifest header.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManifestStats {
    #[serde(rename = "totalImages")]
    pub total_images: u32,
    /// Total thumbnail bytes, formatted as megabytes with two decimals.
    #[serde(rename = "thumbnailSizeMB")]
    pub thumbnail_size_mb: String,
    /// Total medium-variant bytes, formatted as megabytes with two decimals.
    #[serde(rename = "mediumSizeMB")]
    pub medium_size_mb: String,
}

impl ManifestStats {
    pub fn new(total_images: u32, thumbnail_bytes: u64, medium_bytes: u64) -> Self {
        Self {
            total_images,
            thumbnail_size_mb: megabytes(thumbnail_bytes),
            medium_size_mb: megabytes(medium_bytes),
        }
    }
}

/// Format a byte count as megabytes with two decimals, e.g. `"3.20"`.
pub fn megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// The root JSON document. Rebuilt in full on every run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub last_generated: DateTime<Utc>,
    pub stats: ManifestStats,
    pub galleries: BTreeMap<String, GalleryNode>,
}

/// Accumulates photo records into the gallery tree.
///
/// A value-semantics reducer: each [`with`](Self::with) consumes the builder
/// and returns it, so the natural use is a fold over process outcomes.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    // gallery id → event id → relative path → record
    galleries: BTreeMap<String, BTreeMap<String, BTreeMap<String, PhotoRecord>>>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under `gallery`/`event`, creating intermediate nodes
    /// on first use. A record with the same original path replaces any
    /// earlier one.
    pub fn with(mut self, gallery: &str, event: &str, record: PhotoRecord) -> Self {
        self.galleries
            .entry(gallery.to_string())
            .or_default()
            .entry(event.to_string())
            .or_default()
            .insert(record.original.clone(), record);
        self
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.galleries
            .values()
            .flat_map(|events| events.values())
            .map(|photos| photos.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort, summarize, and produce the final manifest.
    ///
    /// Photos sort by date descending (ties broken by path for determinism).
    /// A gallery whose only event is the synthetic `general` bucket collapses
    /// to the flat layout.
    pub fn finalize(self, stats: ManifestStats) -> Manifest {
        let galleries = self
            .galleries
            .into_iter()
            .map(|(gallery_id, events)| {
                let total: usize = events.values().map(|photos| photos.len()).sum();
                let flat = events.len() == 1 && events.contains_key(GENERAL_EVENT);

                let layout = if flat {
                    let photos = events.into_values().next().expect("one event");
                    GalleryLayout::Flat {
                        images: sorted_photos(photos),
                    }
                } else {
                    GalleryLayout::Events {
                        events: events
                            .into_iter()
                            .map(|(event_id, photos)| {
                                let node = EventNode {
                                    title: naming::humanize(&event_id),
                                    description: photo_count_description(photos.len()),
                                    photos: sorted_photos(photos),
                                };
                                (event_id, node)
                            })
                            .collect(),
                    }
                };

                let node = GalleryNode {
                    title: naming::humanize(&gallery_id),
                    description: photo_count_description(total),
                    layout,
                };
                (gallery_id, node)
            })
            .collect();

        Manifest {
            version: "1.0".to_string(),
            last_generated: Utc::now(),
            stats,
            galleries,
        }
    }
}

fn sorted_photos(photos: BTreeMap<String, PhotoRecord>) -> Vec<PhotoRecord> {
    let mut list: Vec<PhotoRecord> = photos.into_values().collect();
    list.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.original.cmp(&b.original)));
    list
}

fn photo_count_description(count: usize) -> String {
    if count == 1 {
        "1 photo".to_string()
    } else {
        format!("{count} photos")
    }
}

/// Serialize the manifest as pretty JSON to `<output_root>/js/gallery-config.json`,
/// overwriting any prior file. Returns the written path.
///
/// A failure here is fatal to the run — the manifest is the entire point.
pub fn write_manifest(manifest: &Manifest, output_root: &Path) -> Result<PathBuf, ManifestError> {
    let path = output_root.join(MANIFEST_REL_PATH);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
