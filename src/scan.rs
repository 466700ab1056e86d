//! Filesystem scanning and gallery placement.
//!
//! Stage 1 of the build pipeline. Walks the source directory recursively and
//! places every supported image into a gallery and an event.
//!
//! ## Directory Structure
//!
//! ```text
//! pics/                            # Source root
//! ├── nature/                      # Gallery (top-level directory)
//! │   ├── sample_1.jpg             # → event "general"
//! │   └── forest_walk.jpg          # → event "forest" (filename prefix)
//! ├── track/                       # Gallery
//! │   ├── race_day/                # Event (second-level directory)
//! │   │   └── finish_line.jpg
//! │   └── practice/
//! │       └── warmup.jpg
//! └── stray.jpg                    # Not inside a gallery — skipped
//! ```
//!
//! ## Placement Rules
//!
//! - The first path segment under the root is the gallery id.
//! - The second segment, when the image sits at least two directories deep,
//!   is the event id.
//! - Images directly under a gallery directory fall into the synthetic
//!   `general` event, unless the filename stem starts with a lowercase
//!   prefix ending in `_` (e.g. `bubble_IMG_6738.jpg` → event `bubble`).
//!   Directory placement always wins over the filename heuristic.
//!
//! ## Failure Semantics
//!
//! A missing source root aborts the run. Unreadable subdirectories are
//! recorded as warnings and their subtrees skipped; the walk continues for
//! the rest of the tree (best-effort, not transactional).

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source directory does not exist: {0}")]
    MissingRoot(PathBuf),
}

/// Supported image extensions (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// The synthetic event for images directly under a gallery directory.
pub const GENERAL_EVENT: &str = "general";

/// A source photograph discovered by the walker. Immutable — never mutated
/// after discovery.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Absolute path on disk.
    pub abs_path: PathBuf,
    /// Path relative to the source root, forward-slash separated.
    pub rel_path: String,
    /// Gallery id: first path segment under the root.
    pub gallery: String,
    /// Event id: second path segment, filename prefix, or `general`.
    pub event: String,
    /// Source file modification time.
    pub modified: SystemTime,
}

/// Result of a scan: discovered images plus non-fatal warnings.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Supported images, sorted by relative path for deterministic output.
    pub images: Vec<SourceImage>,
    /// Files directly under the root, outside any gallery directory.
    pub skipped_root_files: Vec<String>,
    /// Unreadable entries encountered during the walk.
    pub warnings: Vec<String>,
}

/// Walk the source root and place every supported image.
///
/// Hidden entries (names starting with `.`) are pruned, unsupported
/// extensions ignored. Unreadable subtrees become [`ScanReport::warnings`].
pub fn scan(root: &Path) -> Result<ScanReport, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let mut report = ScanReport::default();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.warnings.push(err.to_string());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_supported_image(path) {
            continue;
        }

        let rel = path.strip_prefix(root).expect("entry is under root");
        let segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        if segments.len() < 2 {
            report.skipped_root_files.push(segments.join("/"));
            continue;
        }

        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(err) => {
                report
                    .warnings
                    .push(format!("{}: {}", path.display(), err));
                continue;
            }
        };

        let gallery = segments[0].clone();
        let event = if segments.len() >= 3 {
            segments[1].clone()
        } else {
            let stem = Path::new(&segments[1])
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            filename_category(&stem)
                .map(str::to_string)
                .unwrap_or_else(|| GENERAL_EVENT.to_string())
        };

        report.images.push(SourceImage {
            abs_path: path.to_path_buf(),
            rel_path: segments.join("/"),
            gallery,
            event,
            modified,
        });
    }

    report.images.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(report)
}

/// Returns `true` if `entry` is a hidden file or directory (leading `.`).
/// The root itself (depth 0) is never considered hidden.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Returns `true` if `path` has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Infer an event from a filename stem's lowercase prefix.
///
/// Mirrors the `^[a-z_]+_` convention: the leading run of lowercase letters
/// and underscores, up to its last underscore, names the event.
///
/// - `bubble_IMG_6738` → Some("bubble")
/// - `my_cool_photo` → Some("my_cool")
/// - `IMG_6738` → None (no lowercase prefix)
/// - `_draft` → None (nothing before the underscore)
fn filename_category(stem: &str) -> Option<&str> {
    let run_end = stem
        .find(|c: char| !(c.is_ascii_lowercase() || c == '_'))
        .unwrap_or(stem.len());
    let run = &stem[..run_end];
    let last_underscore = run.rfind('_')?;
    if last_underscore == 0 {
        return None;
    }
    Some(&run[..last_underscore])
}
