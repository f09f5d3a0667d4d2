//! Filename probing, the fallback when no manifest lists a category.
//!
//! Without a manifest there is no directory listing to read, so the runtime
//! guesses. Eight naming patterns are tried for every index `1..=max_index`,
//! each with twelve extension spellings:
//!
//! ```text
//! signs1.jpg  signs_1.jpg  signs-1.jpg  image1.jpg  img1.jpg  1.jpg  01.jpg  signs_01.jpg
//! ```
//!
//! Candidates are tried pattern by pattern, then index, then extension, so the
//! total work is bounded by `8 × max_index × 12` fetches (4800 by default).
//! Patterns overlap once indices reach two digits (`10.jpg` comes from both
//! `{i}` and `{i:02}`); every path is fetched at most once.

use crate::discovery::image_dimensions;
use crate::naming;
use crate::source::AssetSource;
use crate::types::ImageEntry;
use std::collections::HashSet;
use tracing::{debug, info};

/// Extension spellings tried for every pattern, in order.
pub const PROBE_EXTENSIONS: [&str; 12] = [
    ".jpg", ".jpeg", ".png", ".webp", ".heic", ".heif", ".JPG", ".JPEG", ".PNG", ".WEBP", ".HEIC",
    ".HEIF",
];

pub const PATTERN_COUNT: usize = 8;

/// Base filenames (no extension) for one index, in pattern order.
pub fn pattern_stems(category: &str, i: u32) -> [String; PATTERN_COUNT] {
    [
        format!("{category}{i}"),
        format!("{category}_{i}"),
        format!("{category}-{i}"),
        format!("image{i}"),
        format!("img{i}"),
        format!("{i}"),
        format!("{i:02}"),
        format!("{category}_{i:02}"),
    ]
}

/// Every candidate path with the index it came from, in probing order.
///
/// Duplicates across patterns are included; the prober skips them.
pub fn candidates(
    url_prefix: &str,
    category: &str,
    max_index: u32,
) -> impl Iterator<Item = (u32, String)> {
    (0..PATTERN_COUNT).flat_map(move |pattern| {
        (1..=max_index).flat_map(move |i| {
            let stem = pattern_stems(category, i)[pattern].clone();
            PROBE_EXTENSIONS
                .iter()
                .map(move |ext| (i, format!("{url_prefix}/{category}/{stem}{ext}")))
        })
    })
}

/// Whether a candidate exists: HEIC only has to be fetchable, anything else
/// has to fully decode to a non-empty image.
async fn exists(source: &dyn AssetSource, path: &str) -> bool {
    match source.fetch(path).await {
        Ok(_) if naming::is_heic(path) => true,
        Ok(bytes) => image_dimensions(&bytes).is_ok(),
        Err(_) => false,
    }
}

/// Probe for a category's images. Returns entries in discovery order.
pub async fn probe_category(
    source: &dyn AssetSource,
    url_prefix: &str,
    category: &str,
    max_index: u32,
) -> Vec<ImageEntry> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut attempts = 0usize;

    for (i, path) in candidates(url_prefix, category, max_index) {
        if !seen.insert(path.clone()) {
            continue;
        }
        attempts += 1;
        if exists(source, &path).await {
            debug!(category, path = %path, "probe hit");
            found.push(ImageEntry::new(path, format!("{category} product {i}")));
        }
    }

    info!(category, found = found.len(), attempts, "probed for images");
    found
}
