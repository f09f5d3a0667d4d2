//! Navigation controls, service-card targets and header state.

use crate::dom::PageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    /// Button class used by the page markup.
    pub fn class(&self) -> &'static str {
        match self {
            Direction::Prev => "carousel-prev",
            Direction::Next => "carousel-next",
        }
    }
}

/// A prev/next button, identified by its `data-carousel` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControl {
    pub category: String,
    pub direction: Direction,
}

impl NavControl {
    pub fn prev(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            direction: Direction::Prev,
        }
    }

    pub fn next(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            direction: Direction::Next,
        }
    }
}

/// Height of the fixed header, subtracted from scroll targets.
pub const HEADER_OFFSET_PX: u32 = 80;

/// Scroll distance past which the header switches to its compact style.
pub const HEADER_SCROLL_THRESHOLD: f64 = 50.0;

/// Where clicking a service card goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Leave the page (from the about page, back to the home gallery).
    Navigate(String),
    /// Smooth-scroll to the n-th carousel section (1-based), keeping the
    /// header clear.
    Section { position: usize, header_offset: u32 },
}

impl ScrollTarget {
    /// Link form of the target, as written on the card's `data-scroll`.
    pub fn href(&self) -> String {
        match self {
            ScrollTarget::Navigate(url) => url.clone(),
            ScrollTarget::Section { position, .. } => format!("#{}", section_anchor(*position)),
        }
    }
}

/// Element id of the n-th carousel section (1-based).
pub fn section_anchor(position: usize) -> String {
    format!("carousel-section-{position}")
}

/// Resolve a service card's `data-target` to a destination.
///
/// Returns `None` for categories that have no carousel section.
pub fn service_card_target(
    page: PageKind,
    category: &str,
    categories: &[String],
) -> Option<ScrollTarget> {
    if page == PageKind::About {
        return Some(ScrollTarget::Navigate("index.html#gallery".to_string()));
    }
    let position = categories.iter().position(|c| c == category)? + 1;
    Some(ScrollTarget::Section {
        position,
        header_offset: HEADER_OFFSET_PX,
    })
}

/// Whether the header shows its compact style at this scroll position.
pub fn header_scrolled(scroll_y: f64) -> bool {
    scroll_y > HEADER_SCROLL_THRESHOLD
}
