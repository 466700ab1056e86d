//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`process`](crate::process) stage (which decides
//! which variants to create) and the [`backend`](super::backend) (which does
//! the actual pixel work). The separation allows swapping backends (e.g. a
//! mock in tests) without changing orchestration logic.

use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Full specification for a resized JPEG variant.
///
/// The target is a square bounding box: the image is scaled to fit inside
/// `max_size`×`max_size` preserving aspect ratio, and never enlarged.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Bounding box edge in pixels.
    pub max_size: u32,
    pub quality: Quality,
    /// EXIF orientation (1-8) to bake into the output before resizing.
    pub orientation: u32,
}
