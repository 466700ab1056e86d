//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate output dimensions for a fit-inside resize.
///
/// Scales the image so both edges fit within a `max_size` square, preserving
/// aspect ratio. Images already inside the box are returned unchanged (no
/// enlargement).
///
/// # Examples
/// ```
/// # use picshelf::imaging::fit_within;
/// assert_eq!(fit_within((2000, 1500), 300), (300, 225));
/// assert_eq!(fit_within((1500, 2000), 300), (225, 300));
/// assert_eq!(fit_within((200, 100), 300), (200, 100)); // never enlarged
/// ```
pub fn fit_within(original: (u32, u32), max_size: u32) -> (u32, u32) {
    let (w, h) = original;
    let longer = w.max(h);
    if longer <= max_size || longer == 0 {
        return original;
    }
    let ratio = max_size as f64 / longer as f64;
    if w >= h {
        (max_size, (h as f64 * ratio).round().max(1.0) as u32)
    } else {
        ((w as f64 * ratio).round().max(1.0) as u32, max_size)
    }
}

/// Swap width/height for EXIF orientations that imply a 90° rotation (5-8).
pub fn oriented_dimensions(dims: (u32, u32), orientation: u32) -> (u32, u32) {
    match orientation {
        5..=8 => (dims.1, dims.0),
        _ => dims,
    }
}

/// Watermark label width for a given image width: 8% of the image width,
/// clamped to [100, 250] px.
pub fn watermark_width(image_width: u32) -> u32 {
    ((image_width as f64 * 0.08).round() as u32).clamp(100, 250)
}

/// Bottom-right watermark position with a 20px margin.
///
/// Coordinates saturate at zero so small images never produce a negative
/// offset.
pub fn watermark_position(image: (u32, u32), overlay: (u32, u32)) -> (i64, i64) {
    const MARGIN: u32 = 20;
    let x = image.0.saturating_sub(overlay.0 + MARGIN);
    let y = image.1.saturating_sub(overlay.1 + MARGIN);
    (x as i64, y as i64)
}
