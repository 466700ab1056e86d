//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! probe (dimensions + EXIF orientation) and resize (decode, orient, scale,
//! encode JPEG). The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked. Tests use a mock that records operations without touching pixels.

use super::params::ResizeParams;
use super::watermark::WatermarkOverlay;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of a probe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Pixel width as stored (pre-rotation).
    pub width: u32,
    /// Pixel height as stored (pre-rotation).
    pub height: u32,
    /// EXIF orientation value, 1 when absent or unreadable.
    pub orientation: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend instance can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Read dimensions and EXIF orientation without decoding pixel data.
    fn probe(&self, path: &Path) -> Result<ImageInfo, BackendError>;

    /// Decode, apply orientation, fit-inside resize, and encode as JPEG.
    /// The watermark, when given, is composited bottom-right after resizing.
    fn resize(
        &self,
        params: &ResizeParams,
        watermark: Option<&WatermarkOverlay>,
    ) -> Result<(), BackendError>;
}
