//! Image operations — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::image_dimensions` + `kamadak-exif` orientation |
//! | **Resize → JPEG** | Lanczos3 fit-inside + `JpegEncoder` |
//! | **EXIF rotation** | `rotate90`/`rotate180`/`rotate270` + flips |
//! | **Watermark** | `imageproc` text rasterization + alpha composite |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Watermark**: Text overlay rendering and compositing

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;
pub mod watermark;

pub use backend::{BackendError, ImageBackend, ImageInfo};
pub use calculations::{fit_within, oriented_dimensions, watermark_position, watermark_width};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
pub use watermark::WatermarkOverlay;
