//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is information-centric, not file-centric. The primary display for
//! every entity (gallery, event, photo) is its semantic identity — title and
//! positional index — with filesystem paths shown as secondary context via
//! indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Galleries
//! 001 Saturday Market (3 photos)
//!     Source: saturday_market/
//!     001 food_stalls (2 photos)
//!         001 Bubble IMG 6738
//!             Source: saturday_market/food_stalls/bubble_IMG_6738.jpg
//! ```
//!
//! ## Process
//!
//! ```text
//! Saturday Market (3 photos)
//!     001 Bubble IMG 6738
//!         Source: saturday_market/food_stalls/bubble_IMG_6738.jpg
//!         original: cached
//!         thumbnail: encoded
//!         medium: encoded
//! ```
//!
//! ## Summary
//!
//! ```text
//! 3 processed (6 encoded, 0 cached, 3 copied)
//! Originals: 14.32 MB  Thumbnails: 0.61 MB  Medium: 3.20 MB
//! Manifest: 3 photos in 1 gallery → public/js/gallery-config.json
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::manifest::{megabytes, Manifest};
use crate::naming;
use crate::process::{ProcessEvent, RunStats, VariantStatus};
use crate::scan::{ScanReport, SourceImage, GENERAL_EVENT};
use std::collections::BTreeMap;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title + photo count.
fn entity_header(index: usize, title: &str, count: usize) -> String {
    let noun = if count == 1 { "photo" } else { "photos" };
    format!("{} {} ({} {})", format_index(index), title, count, noun)
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan output showing the discovered gallery structure.
pub fn format_scan_output(report: &ScanReport) -> Vec<String> {
    let mut lines = Vec::new();

    for warning in &report.warnings {
        lines.push(format!("warning: {warning}"));
    }
    for skipped in &report.skipped_root_files {
        lines.push(format!(
            "warning: {skipped} is outside any gallery directory, skipped"
        ));
    }

    lines.push("Galleries".to_string());
    if report.images.is_empty() {
        lines.push("    (no images found)".to_string());
        return lines;
    }

    // gallery → event → images
    let mut tree: BTreeMap<&str, BTreeMap<&str, Vec<&SourceImage>>> = BTreeMap::new();
    for image in &report.images {
        tree.entry(&image.gallery)
            .or_default()
            .entry(&image.event)
            .or_default()
            .push(image);
    }

    for (g_idx, (gallery, events)) in tree.iter().enumerate() {
        let total: usize = events.values().map(|v| v.len()).sum();
        lines.push(entity_header(g_idx + 1, &naming::humanize(gallery), total));
        lines.push(format!("    Source: {gallery}/"));

        let flat = events.len() == 1 && events.contains_key(GENERAL_EVENT);
        for (e_idx, (event, images)) in events.iter().enumerate() {
            let image_depth = if flat {
                1
            } else {
                lines.push(format!(
                    "{}{}",
                    indent(1),
                    entity_header(e_idx + 1, &naming::humanize(event), images.len())
                ));
                2
            };
            for (i_idx, image) in images.iter().enumerate() {
                let title = naming::title_from_filename(
                    image.rel_path.rsplit('/').next().unwrap_or(&image.rel_path),
                );
                lines.push(format!(
                    "{}{} {}",
                    indent(image_depth),
                    format_index(i_idx + 1),
                    title
                ));
                lines.push(format!(
                    "{}    Source: {}",
                    indent(image_depth),
                    image.rel_path
                ));
            }
        }
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(report: &ScanReport) {
    for line in format_scan_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::GalleryStarted {
            title, image_count, ..
        } => {
            let noun = if *image_count == 1 { "photo" } else { "photos" };
            vec![format!("{} ({} {})", title, image_count, noun)]
        }
        ProcessEvent::WatermarkDisabled { reason } => {
            vec![format!("warning: watermark disabled: {}", reason)]
        }
        ProcessEvent::ImageProcessed {
            index,
            title,
            rel_path,
            variants,
            fallback,
        } => {
            let mut lines = Vec::new();
            lines.push(format!("    {} {}", format_index(*index), title));
            lines.push(format!("        Source: {}", rel_path));
            for variant in variants {
                let status = match variant.status {
                    VariantStatus::Cached => "cached",
                    VariantStatus::Encoded => "encoded",
                    VariantStatus::Copied => "copied",
                };
                lines.push(format!("        {}: {}", variant.label, status));
            }
            if let Some(reason) = fallback {
                lines.push(format!("        fallback: {}", reason));
            }
            lines
        }
        ProcessEvent::ImageFailed { rel_path, reason } => {
            vec![format!("    {} FAILED: {}", rel_path, reason)]
        }
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Format the end-of-run summary: counts, aggregate sizes, manifest location.
pub fn format_summary(stats: &RunStats, manifest: &Manifest, manifest_path: &Path) -> Vec<String> {
    let photo_count = manifest.stats.total_images;
    let photo_noun = if photo_count == 1 { "photo" } else { "photos" };
    let gallery_count = manifest.galleries.len();
    let gallery_noun = if gallery_count == 1 {
        "gallery"
    } else {
        "galleries"
    };
    vec![
        stats.to_string(),
        format!(
            "Originals: {} MB  Thumbnails: {} MB  Medium: {} MB",
            megabytes(stats.original_bytes),
            megabytes(stats.thumbnail_bytes),
            megabytes(stats.medium_bytes)
        ),
        format!(
            "Manifest: {} {} in {} {} \u{2192} {}",
            photo_count,
            photo_noun,
            gallery_count,
            gallery_noun,
            manifest_path.display()
        ),
    ]
}

/// Print the run summary to stdout.
pub fn print_summary(stats: &RunStats, manifest: &Manifest, manifest_path: &Path) {
    for line in format_summary(stats, manifest, manifest_path) {
        println!("{}", line);
    }
}
