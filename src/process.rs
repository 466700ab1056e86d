//! Image processing and variant generation.
//!
//! Stage 2 of the build pipeline. Takes the images discovered by the scan
//! stage and produces three variants per photo under the output root:
//!
//! ```text
//! public/images/
//! ├── thumbnails/<gallery>/<path>.jpg    # fit inside 300px, quality 80
//! ├── medium/<gallery>/<path>.jpg        # fit inside 1200px, quality 85, watermark
//! └── original/<gallery>/<path>          # byte-for-byte copy
//! ```
//!
//! ## Incremental Builds
//!
//! A variant is regenerated only when it is missing or the source file's
//! mtime is newer than the variant's. That comparison is the entire cache —
//! no content hashes, no cache manifest. `force` bypasses it.
//!
//! ## Failure Semantics
//!
//! Per-file problems never abort the run:
//!
//! - Unreadable source → the photo is skipped and reported as a failure.
//! - Undecodable source → the original bytes are copied verbatim to each
//!   resized-variant path as a degraded substitute; the photo still enters
//!   the manifest (dimensions 0×0) and counts as failed.
//!
//! ## Batched Parallelism
//!
//! Images are processed in fixed-size batches (`processing.batch_size`,
//! default 3) with rayon parallelism inside each batch. The pipeline waits
//! for a whole batch before starting the next, bounding peak memory — a
//! throughput safety valve, not a correctness requirement.

use crate::config::GalleryConfig;
use crate::imaging::{ImageBackend, ImageInfo, Quality, ResizeParams, WatermarkOverlay};
use crate::manifest::PhotoRecord;
use crate::naming;
use crate::scan::SourceImage;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A successfully processed photo with its placement.
#[derive(Debug, Clone)]
pub struct PlacedPhoto {
    pub gallery: String,
    pub event: String,
    pub record: PhotoRecord,
}

/// A photo that could not be fully processed.
#[derive(Debug, Clone)]
pub struct PhotoFailure {
    pub rel_path: String,
    pub reason: String,
}

/// What happened to a single output variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Up to date on disk; nothing written.
    Cached,
    /// Re-encoded from the source.
    Encoded,
    /// Bytes copied verbatim (original variant, or decode-failure fallback).
    Copied,
}

#[derive(Debug, Clone)]
pub struct VariantReport {
    pub label: &'static str,
    pub status: VariantStatus,
}

/// Progress events streamed to the caller during processing.
#[derive(Debug)]
pub enum ProcessEvent {
    GalleryStarted {
        gallery: String,
        title: String,
        image_count: usize,
    },
    /// Watermarking was requested but the overlay could not be rendered.
    /// Emitted once; the run continues without watermarks.
    WatermarkDisabled { reason: String },
    ImageProcessed {
        /// 1-based position within the gallery.
        index: usize,
        title: String,
        rel_path: String,
        variants: Vec<VariantReport>,
        /// Set when resized variants are copy-fallbacks of an undecodable source.
        fallback: Option<String>,
    },
    ImageFailed { rel_path: String, reason: String },
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: u32,
    pub failed: u32,
    pub variants_encoded: u32,
    pub variants_cached: u32,
    pub variants_copied: u32,
    pub original_bytes: u64,
    pub thumbnail_bytes: u64,
    pub medium_bytes: u64,
}

impl RunStats {
    fn count_variant(&mut self, status: VariantStatus) {
        match status {
            VariantStatus::Cached => self.variants_cached += 1,
            VariantStatus::Encoded => self.variants_encoded += 1,
            VariantStatus::Copied => self.variants_copied += 1,
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed > 0 {
            write!(f, "{} processed, {} failed", self.processed, self.failed)?;
        } else {
            write!(f, "{} processed", self.processed)?;
        }
        write!(
            f,
            " ({} encoded, {} cached, {} copied)",
            self.variants_encoded, self.variants_cached, self.variants_copied
        )
    }
}

/// Result of the process stage.
#[derive(Debug)]
pub struct ProcessReport {
    pub photos: Vec<PlacedPhoto>,
    pub failures: Vec<PhotoFailure>,
    pub stats: RunStats,
}

/// Output directories under `<output_root>/images/`.
struct OutputLayout {
    thumbnails: PathBuf,
    medium: PathBuf,
    original: PathBuf,
}

impl OutputLayout {
    fn create(output_root: &Path) -> Result<Self, ProcessError> {
        let images = output_root.join("images");
        let layout = Self {
            thumbnails: images.join("thumbnails"),
            medium: images.join("medium"),
            original: images.join("original"),
        };
        for dir in [&layout.thumbnails, &layout.medium, &layout.original] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(layout)
    }
}

/// Process all images and produce placed photo records.
///
/// Only setup problems (output directories cannot be created) are errors;
/// per-file problems become [`ProcessReport::failures`].
pub fn process(
    backend: &impl ImageBackend,
    images: &[SourceImage],
    output_root: &Path,
    config: &GalleryConfig,
    force: bool,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessReport, ProcessError> {
    let layout = OutputLayout::create(output_root)?;

    let watermark = if config.watermark.enabled {
        match WatermarkOverlay::render(
            &config.watermark.text,
            Path::new(&config.watermark.font_path),
            config.watermark.opacity,
        ) {
            Ok(overlay) => Some(overlay),
            Err(err) => {
                emit(&events, ProcessEvent::WatermarkDisabled {
                    reason: err.to_string(),
                });
                None
            }
        }
    } else {
        None
    };

    // Group by gallery, preserving the scan's path order within each.
    let mut by_gallery: BTreeMap<&str, Vec<&SourceImage>> = BTreeMap::new();
    for image in images {
        by_gallery.entry(&image.gallery).or_default().push(image);
    }

    let mut report = ProcessReport {
        photos: Vec::new(),
        failures: Vec::new(),
        stats: RunStats::default(),
    };

    for (gallery, gallery_images) in &by_gallery {
        emit(&events, ProcessEvent::GalleryStarted {
            gallery: gallery.to_string(),
            title: naming::humanize(gallery),
            image_count: gallery_images.len(),
        });

        let mut index = 0;
        for batch in gallery_images.chunks(config.processing.batch_size.max(1)) {
            let outcomes: Vec<PhotoOutcome> = batch
                .par_iter()
                .map(|image| process_photo(backend, image, &layout, config, watermark.as_ref(), force))
                .collect();

            for outcome in outcomes {
                index += 1;
                record_outcome(outcome, index, &mut report, &events);
            }
        }
    }

    Ok(report)
}

/// Per-photo result handed back from a batch worker.
struct PhotoOutcome {
    rel_path: String,
    placed: Option<PlacedPhoto>,
    /// Present for both hard failures (no `placed`) and degraded fallbacks.
    failure: Option<String>,
    variants: Vec<VariantReport>,
    original_bytes: u64,
    thumbnail_bytes: u64,
    medium_bytes: u64,
}

fn record_outcome(
    outcome: PhotoOutcome,
    index: usize,
    report: &mut ProcessReport,
    events: &Option<Sender<ProcessEvent>>,
) {
    for variant in &outcome.variants {
        report.stats.count_variant(variant.status);
    }
    report.stats.original_bytes += outcome.original_bytes;
    report.stats.thumbnail_bytes += outcome.thumbnail_bytes;
    report.stats.medium_bytes += outcome.medium_bytes;

    match (outcome.placed, outcome.failure) {
        (Some(placed), fallback) => {
            if fallback.is_some() {
                report.stats.failed += 1;
            } else {
                report.stats.processed += 1;
            }
            emit(events, ProcessEvent::ImageProcessed {
                index,
                title: placed.record.title.clone(),
                rel_path: outcome.rel_path.clone(),
                variants: outcome.variants,
                fallback: fallback.clone(),
            });
            if let Some(reason) = fallback {
                report.failures.push(PhotoFailure {
                    rel_path: outcome.rel_path,
                    reason,
                });
            }
            report.photos.push(placed);
        }
        (None, reason) => {
            let reason = reason.unwrap_or_else(|| "unknown error".to_string());
            report.stats.failed += 1;
            emit(events, ProcessEvent::ImageFailed {
                rel_path: outcome.rel_path.clone(),
                reason: reason.clone(),
            });
            report.failures.push(PhotoFailure {
                rel_path: outcome.rel_path,
                reason,
            });
        }
    }
}

fn process_photo(
    backend: &impl ImageBackend,
    image: &SourceImage,
    layout: &OutputLayout,
    config: &GalleryConfig,
    watermark: Option<&WatermarkOverlay>,
    force: bool,
) -> PhotoOutcome {
    let rel_jpg = jpg_extension(&image.rel_path);
    let original_out = layout.original.join(&image.rel_path);
    let thumbnail_out = layout.thumbnails.join(&rel_jpg);
    let medium_out = layout.medium.join(&rel_jpg);

    let mut outcome = PhotoOutcome {
        rel_path: image.rel_path.clone(),
        placed: None,
        failure: None,
        variants: Vec::new(),
        original_bytes: 0,
        thumbnail_bytes: 0,
        medium_bytes: 0,
    };

    // Original copy first: if the source cannot even be read, the photo is
    // skipped entirely.
    match refresh_copy(image, &original_out, force) {
        Ok(status) => outcome.variants.push(VariantReport {
            label: "original",
            status,
        }),
        Err(err) => {
            outcome.failure = Some(format!("unreadable source: {err}"));
            return outcome;
        }
    }

    // Probe failure switches the resized variants into copy-fallback mode.
    let info = match backend.probe(&image.abs_path) {
        Ok(info) => info,
        Err(err) => {
            outcome.failure = Some(err.to_string());
            ImageInfo {
                width: 0,
                height: 0,
                orientation: 1,
            }
        }
    };

    let thumbnail = refresh_resized(
        backend,
        image,
        &thumbnail_out,
        config.thumbnails.max_size,
        Quality::new(config.thumbnails.quality),
        info.orientation,
        None, // thumbnails are never watermarked
        force,
        &mut outcome.failure,
    );
    match thumbnail {
        Ok(status) => outcome.variants.push(VariantReport {
            label: "thumbnail",
            status,
        }),
        Err(err) => {
            outcome.failure = Some(format!("thumbnail fallback failed: {err}"));
            return outcome;
        }
    }

    let medium = refresh_resized(
        backend,
        image,
        &medium_out,
        config.medium.max_size,
        Quality::new(config.medium.quality),
        info.orientation,
        watermark,
        force,
        &mut outcome.failure,
    );
    match medium {
        Ok(status) => outcome.variants.push(VariantReport {
            label: "medium",
            status,
        }),
        Err(err) => {
            outcome.failure = Some(format!("medium fallback failed: {err}"));
            return outcome;
        }
    }

    outcome.original_bytes = file_size(&original_out);
    outcome.thumbnail_bytes = file_size(&thumbnail_out);
    outcome.medium_bytes = file_size(&medium_out);

    let filename = image.rel_path.rsplit('/').next().unwrap_or(&image.rel_path);
    outcome.placed = Some(PlacedPhoto {
        gallery: image.gallery.clone(),
        event: image.event.clone(),
        record: PhotoRecord {
            original: format!("/images/original/{}", image.rel_path),
            thumbnail: format!("/images/thumbnails/{}", rel_jpg),
            medium: format!("/images/medium/{}", rel_jpg),
            title: naming::title_from_filename(filename),
            date: DateTime::<Utc>::from(image.modified),
            width: info.width,
            height: info.height,
            orientation: info.orientation,
        },
    });
    outcome
}

/// Copy the source verbatim if the target is missing or stale.
fn refresh_copy(
    image: &SourceImage,
    output: &Path,
    force: bool,
) -> Result<VariantStatus, std::io::Error> {
    if !force && !needs_update(image.modified, output) {
        return Ok(VariantStatus::Cached);
    }
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&image.abs_path, output)?;
    Ok(VariantStatus::Copied)
}

/// Regenerate a resized variant if stale. On encode failure the original
/// bytes are copied verbatim as a degraded substitute and `degraded` records
/// the first error; only a failing fallback copy is a hard error.
#[allow(clippy::too_many_arguments)]
fn refresh_resized(
    backend: &impl ImageBackend,
    image: &SourceImage,
    output: &Path,
    max_size: u32,
    quality: Quality,
    orientation: u32,
    watermark: Option<&WatermarkOverlay>,
    force: bool,
    degraded: &mut Option<String>,
) -> Result<VariantStatus, std::io::Error> {
    if !force && !needs_update(image.modified, output) {
        return Ok(VariantStatus::Cached);
    }

    if degraded.is_none() {
        let params = ResizeParams {
            source: image.abs_path.clone(),
            output: output.to_path_buf(),
            max_size,
            quality,
            orientation,
        };
        match backend.resize(&params, watermark) {
            Ok(()) => return Ok(VariantStatus::Encoded),
            Err(err) => *degraded = Some(err.to_string()),
        }
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&image.abs_path, output)?;
    Ok(VariantStatus::Copied)
}

/// `true` when `output` is missing or older than the source.
///
/// This mtime comparison is the sole caching mechanism: a touched-but-
/// unchanged source regenerates its variants.
fn needs_update(source_modified: SystemTime, output: &Path) -> bool {
    match std::fs::metadata(output).and_then(|m| m.modified()) {
        Ok(output_modified) => source_modified > output_modified,
        Err(_) => true,
    }
}

/// Replace the extension with `.jpg`, keeping forward slashes.
fn jpg_extension(rel_path: &str) -> String {
    Path::new(rel_path)
        .with_extension("jpg")
        .to_string_lossy()
        .into_owned()
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver just means nobody is listening.
        let _ = tx.send(event);
    }
}
