//! Filename conventions shared by the manifest builder and the runtime.
//!
//! The builder and the gallery never talk to each other directly; they agree
//! on names instead:
//!
//! - `images/{category}/` holds a category's images and feeds the
//!   `{category}-carousel` track.
//! - `images/service-{category}/` feeds the `{category}-bg` manifest key.
//! - Alt text comes from the file stem with `-` and `_` turned into spaces:
//!   `neon-open_sign.jpg` in `signs/` → `"signs - neon open sign"`.

use std::path::Path;

/// Manifest key for section background images.
pub const MISC_KEY: &str = "misc";

/// Hidden files and macOS AppleDouble metadata (`._photo.jpg`) are never images.
pub fn is_hidden(filename: &str) -> bool {
    filename.starts_with('.')
}

/// Extension of `filename` without the dot, as written.
pub fn extension(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|e| e.to_str())
}

/// File stem with separators normalized to spaces.
pub fn display_stem(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.replace(['-', '_'], " ")
}

/// Alt text for a manifest entry: `"{label} - {display stem}"`.
pub fn alt_text(label: &str, filename: &str) -> String {
    format!("{} - {}", label, display_stem(filename))
}

/// Manifest key for a service background directory.
///
/// `service-signs` → `signs-bg`. Directories without the prefix keep their name.
pub fn background_key(service_dir: &str) -> String {
    let base = service_dir.strip_prefix("service-").unwrap_or(service_dir);
    format!("{base}-bg")
}

/// Whether a path names a HEIC/HEIF image, which browsers cannot display as-is.
pub fn is_heic(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".heic") || lower.ends_with(".heif")
}

/// Document id of the track hosting a category's slides.
pub fn track_id(category: &str) -> String {
    format!("{category}-carousel")
}
