//! # Picshelf
//!
//! A static site generator for photo gallery websites. Your filesystem is the
//! data source: top-level directories under the source root become galleries,
//! second-level directories become events, and every supported image gets a
//! set of resized variants plus an entry in a JSON manifest that a static
//! gallery front end fetches at page load.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scan      pics/     →  SourceImage list       (filesystem → structured data)
//! 2. Process   images    →  public/images/         (thumbnail + medium + original copy)
//! 3. Manifest  outcomes  →  public/js/gallery-config.json
//! ```
//!
//! The stages are independent library functions, so unit tests can exercise
//! placement and manifest logic without touching the filesystem or encoding
//! images, and the CLI is a thin driver.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — walks the source directory, places images into galleries/events |
//! | [`process`] | Stage 2 — generates JPEG variants with an mtime-based incremental skip |
//! | [`manifest`] | Stage 3 — accumulates photo records into the gallery tree and writes JSON |
//! | [`config`] | `gallery.toml` loading, defaults, merging, validation |
//! | [`imaging`] | Image operations: dimension math, EXIF rotation, resize, watermark |
//! | [`naming`] | Filename → display title derivation |
//! | [`output`] | CLI output formatting — tree display and run summaries |
//!
//! # Design Decisions
//!
//! ## JPEG-Only Variants
//!
//! Thumbnails and medium images are always encoded as JPEG regardless of the
//! source format. Galleries serve to every browser in existence, encoders are
//! fast, and a single output format keeps the variant directories and the
//! manifest shape trivial. Originals are copied byte-for-byte, so nothing is
//! ever lost.
//!
//! ## mtime Cache, Not Content Hashing
//!
//! A variant is regenerated only when its source file's modification time is
//! newer than the variant on disk. This makes repeat builds near-instant with
//! no cache manifest to maintain. The trade-off is accepted and documented: a
//! restored-but-unchanged file with a fresh mtime re-encodes unnecessarily.
//!
//! ## Pure-Rust Imaging
//!
//! All pixel work goes through the `image` crate (Lanczos3 resampling, JPEG
//! encoding) with EXIF orientation read via `kamadak-exif` and watermark text
//! rasterized with `imageproc`. No ImageMagick, no system dependencies — the
//! binary is fully self-contained.
//!
//! ## Reducer-Style Manifest Builder
//!
//! Photo records are folded into a [`manifest::ManifestBuilder`] value that is
//! only mutated by consuming it, then finalized once into the serialized tree.
//! There is no ambient accumulator shared across the run.

pub mod config;
pub mod imaging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
