//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Manifest written to images/manifest.json
//!
//! Categories
//!   - signs: 2 images
//!   - jewelry: 0 images
//!   ...
//!   - signs-bg (service button): 1 image
//!   - misc (background images): 3 images
//! ```
//!
//! Product categories are always listed. Service backgrounds and misc only
//! appear when they hold images. Scan issues, if any, follow under `Issues`.
//!
//! ## Preview
//!
//! ```text
//! Preview (desktop)
//!     Manifest: found
//!     Backgrounds: 4 applied
//!
//! Carousels
//!   - signs: 5 slides, slide 1, auto-play running
//!   - decor: 3 slides (1 hidden), slide 1, auto-play running
//!   - events: placeholder
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::carousel::AutoPlay;
use crate::gallery::{Gallery, InitReport};
use crate::scan::{BuildReport, SectionKind};
use std::path::Path;

/// `1 image`, `2 images`, `0 images`.
fn image_count(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} image{plural}")
}

fn slide_count(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} slide{plural}")
}

fn autoplay_label(autoplay: AutoPlay) -> &'static str {
    match autoplay {
        AutoPlay::Running => "auto-play running",
        AutoPlay::Paused => "auto-play paused",
        AutoPlay::Disabled => "auto-play off",
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the builder summary. `written` is `None` for a dry run.
pub fn format_build_output(report: &BuildReport, written: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();
    match written {
        Some(path) => lines.push(format!("Manifest written to {}", path.display())),
        None => lines.push("Manifest not written (check only)".to_string()),
    }
    lines.push(String::new());
    lines.push("Categories".to_string());

    for section in &report.sections {
        match section.kind {
            SectionKind::Product => {
                lines.push(format!("  - {}: {}", section.key, image_count(section.count)));
            }
            SectionKind::ServiceBackground if section.count > 0 => {
                lines.push(format!(
                    "  - {} (service button): {}",
                    section.key,
                    image_count(section.count)
                ));
            }
            SectionKind::Misc if section.count > 0 => {
                lines.push(format!(
                    "  - {} (background images): {}",
                    section.key,
                    image_count(section.count)
                ));
            }
            _ => {}
        }
    }

    if report.has_issues() {
        lines.push(String::new());
        lines.push("Issues".to_string());
        for issue in &report.issues {
            lines.push(format!("  - {}: {}", issue.path.display(), issue.message));
        }
    }
    lines
}

pub fn print_build_output(report: &BuildReport, written: Option<&Path>) {
    for line in format_build_output(report, written) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

/// Format the state of an initialized gallery.
pub fn format_preview_output(gallery: &Gallery, report: &InitReport) -> Vec<String> {
    let device = if gallery.profile().is_mobile() {
        "mobile"
    } else {
        "desktop"
    };
    let mut lines = vec![
        format!("Preview ({device})"),
        format!(
            "    Manifest: {}",
            if report.manifest_found {
                "found"
            } else {
                "missing"
            }
        ),
        format!("    Backgrounds: {} applied", report.backgrounds_applied),
    ];
    if report.errors > 0 {
        lines.push(format!("    Errors: {}", report.errors));
    }
    if report.autoplay_disabled {
        lines.push("    Auto-play disabled after too many errors".to_string());
    }

    lines.push(String::new());
    lines.push("Carousels".to_string());
    for (category, _) in &report.categories {
        let Some(track) = gallery.document().category_track(category) else {
            continue;
        };
        let track = track.borrow();
        if track.has_placeholder() {
            lines.push(format!("  - {category}: placeholder"));
            continue;
        }
        let hidden = track.slides().len() - track.visible_count();
        let mut line = format!("  - {}: {}", category, slide_count(track.image_count()));
        if hidden > 0 {
            line.push_str(&format!(" ({hidden} hidden)"));
        }
        match gallery.carousel(category) {
            Some(carousel) if !carousel.is_inert() && carousel.slide_count() > 0 => {
                line.push_str(&format!(
                    ", slide {}, {}",
                    carousel.current_index() + 1,
                    autoplay_label(carousel.autoplay())
                ));
            }
            _ => line.push_str(", no carousel"),
        }
        lines.push(line);
    }
    lines
}

pub fn print_preview_output(gallery: &Gallery, report: &InitReport) {
    for line in format_preview_output(gallery, report) {
        println!("{}", line);
    }
}
