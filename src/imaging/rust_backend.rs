//! Pure Rust image processing backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate (pure Rust decoders) |
//! | Dimensions | `image::image_dimensions` (header only, no full decode) |
//! | EXIF orientation | `kamadak-exif` (best-effort, 1 when absent) |
//! | Resize | `image::DynamicImage::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, ImageBackend, ImageInfo};
use super::calculations::fit_within;
use super::params::ResizeParams;
use super::watermark::WatermarkOverlay;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::BufWriter;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the EXIF orientation tag (1-8). Best-effort: missing EXIF, missing
/// tag, or out-of-range values all resolve to 1 (normal).
pub fn read_orientation(path: &Path) -> u32 {
    let Ok(file) = std::fs::File::open(path) else {
        return 1;
    };
    let mut reader = std::io::BufReader::new(file);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut reader) else {
        return 1;
    };
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .filter(|v| (1..=8).contains(v))
        .unwrap_or(1)
}

/// Bake an EXIF orientation into the pixel data so the output displays
/// upright with no metadata.
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("failed to decode {}: {}", path.display(), e))
        })
}

/// Encode and save as JPEG at the given quality. RGBA inputs are flattened
/// to RGB first — the JPEG encoder has no alpha channel.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn probe(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(ImageInfo {
            width,
            height,
            orientation: read_orientation(path),
        })
    }

    fn resize(
        &self,
        params: &ResizeParams,
        watermark: Option<&WatermarkOverlay>,
    ) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let img = apply_orientation(img, params.orientation);

        let (width, height) = (img.width(), img.height());
        let (out_w, out_h) = fit_within((width, height), params.max_size);
        let resized = if (out_w, out_h) != (width, height) {
            img.resize(out_w, out_h, FilterType::Lanczos3)
        } else {
            img
        };

        let final_img = match watermark {
            Some(overlay) => {
                let mut rgba = resized.to_rgba8();
                overlay.apply(&mut rgba);
                DynamicImage::ImageRgba8(rgba)
            }
            None => resized,
        };

        if let Some(parent) = params.output.parent() {
            std::fs::create_dir_all(parent).map_err(BackendError::Io)?;
        }
        save_jpeg(&final_img, &params.output, params.quality.value())
    }
}
