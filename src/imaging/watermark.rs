//! Text watermark rendering and compositing.
//!
//! The watermark label is rasterized once per run into a transparent RGBA
//! overlay, then scaled per image (8% of the image width, clamped to
//! [100, 250] px) and alpha-composited into the bottom-right corner with a
//! 20px margin. Only the medium variant is watermarked — thumbnails are too
//! small for a legible label.

use super::backend::BackendError;
use super::calculations::{watermark_position, watermark_width};
use ab_glyph::{FontVec, PxScale};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;

/// Font size the label is rasterized at. The overlay is downscaled per image,
/// so this only needs to be large enough to stay crisp at 250px wide.
const RENDER_SCALE: f32 = 48.0;

/// Padding around the rendered text inside the overlay canvas.
const PADDING: u32 = 12;

/// A pre-rendered watermark label, shared across the run.
pub struct WatermarkOverlay {
    image: RgbaImage,
}

impl WatermarkOverlay {
    /// Rasterize `text` with the font at `font_path` into a transparent
    /// overlay. `opacity` scales the text alpha (0.0-1.0).
    pub fn render(text: &str, font_path: &Path, opacity: f32) -> Result<Self, BackendError> {
        let bytes = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(bytes).map_err(|_| {
            BackendError::ProcessingFailed(format!(
                "not a usable font file: {}",
                font_path.display()
            ))
        })?;

        let scale = PxScale::from(RENDER_SCALE);
        let (text_w, text_h) = text_size(scale, &font, text);
        let width = text_w.max(1) + PADDING * 2;
        let height = text_h.max(1) + PADDING * 2;

        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        draw_text_mut(
            &mut canvas,
            Rgba([255, 255, 255, alpha]),
            PADDING as i32,
            PADDING as i32,
            scale,
            &font,
            text,
        );

        Ok(Self { image: canvas })
    }

    /// Build an overlay from an already-rendered image (tests).
    #[cfg(test)]
    pub(crate) fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Composite the label onto `target`, bottom-right with a 20px margin.
    ///
    /// The overlay is scaled to [`watermark_width`] of the target width,
    /// never enlarged beyond its rendered size.
    pub fn apply(&self, target: &mut RgbaImage) {
        let target_w = watermark_width(target.width()).min(self.image.width());
        let scaled = if target_w < self.image.width() {
            let target_h = (self.image.height() as f64 * target_w as f64
                / self.image.width() as f64)
                .round()
                .max(1.0) as u32;
            image::imageops::resize(&self.image, target_w, target_h, FilterType::Triangle)
        } else {
            self.image.clone()
        };

        let (x, y) = watermark_position(
            (target.width(), target.height()),
            (scaled.width(), scaled.height()),
        );
        image::imageops::overlay(target, &scaled, x, y);
    }
}
