//! Display title derivation from filenames and directory identifiers.
//!
//! Galleries, events, and photos all take their display titles from their
//! on-disk names. The same humanization applies everywhere:
//!
//! - `saturday_market/` → "Saturday Market" (gallery title)
//! - `my_cool-Photo.JPG` → "My Cool Photo" (photo title)
//! - `raceDay` → "Race Day" (camelCase identifiers split on the boundary)

use std::path::Path;

/// Humanize an identifier into a display title.
///
/// Underscores and hyphens become spaces, camelCase boundaries (a lowercase
/// letter followed by an uppercase one) are split, and the first letter of
/// each word is uppercased. Runs of separators collapse into a single space.
pub fn humanize(identifier: &str) -> String {
    let spaced: String = identifier
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();

    let mut split = String::with_capacity(spaced.len() + 4);
    let mut prev_lower = false;
    for c in spaced.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            split.push(' ');
        }
        prev_lower = c.is_ascii_lowercase();
        split.push(c);
    }

    split
        .split_whitespace()
        .map(titlecase_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive a photo title from its filename: strip the extension, then humanize.
///
/// `my_cool-Photo.JPG` → "My Cool Photo"
pub fn title_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    humanize(&stem)
}

fn titlecase_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
