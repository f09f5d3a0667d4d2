//! In-memory page model.
//!
//! The gallery never touches real markup; it works against this model, which
//! mirrors the parts of the page the runtime reads and writes:
//!
//! - **Tracks** (`{category}-carousel`) holding slides. Tracks are shared
//!   handles ([`TrackHandle`]) because the discovery code and the carousel that
//!   later owns the track both hold one, the same way both would hold a DOM
//!   element reference.
//! - **Regions** that can receive a background (hero, trust section, service
//!   cards, ...). A region that is not on the page silently ignores writes.
//! - **Object URLs** minted for converted HEIC bytes.
//! - **Header state**: compact once the page has scrolled past the threshold.
//!
//! [`crate::render`] turns a document into an HTML snapshot for previews.

use crate::backgrounds::BackgroundStyle;
use crate::carousel::SlideTrack;
use crate::config::GalleryConfig;
use crate::naming;
use crate::navigation;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideContent {
    Image {
        /// What the image element loads: the asset path or an object URL.
        src: String,
        alt: String,
        /// Manifest path the slide came from; used for duplicate detection.
        origin: String,
    },
    Placeholder {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub content: SlideContent,
    pub hidden: bool,
}

impl Slide {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, SlideContent::Placeholder { .. })
    }

    pub fn origin(&self) -> Option<&str> {
        match &self.content {
            SlideContent::Image { origin, .. } => Some(origin),
            SlideContent::Placeholder { .. } => None,
        }
    }
}

/// A carousel track and its slides.
#[derive(Debug, Clone, Default)]
pub struct Track {
    id: String,
    slides: Vec<Slide>,
    offset_percent: i64,
}

impl Track {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// No children at all, hidden ones included.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slides that take part in rotation.
    pub fn visible_count(&self) -> usize {
        self.slides.iter().filter(|s| !s.hidden).count()
    }

    /// Visible slides backed by a real image.
    pub fn image_count(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| !s.hidden && !s.is_placeholder())
            .count()
    }

    pub fn has_placeholder(&self) -> bool {
        self.slides.iter().any(Slide::is_placeholder)
    }

    pub fn contains_origin(&self, origin: &str) -> bool {
        self.slides.iter().any(|s| s.origin() == Some(origin))
    }

    /// Append an image slide, dropping any placeholder first.
    ///
    /// Returns the new slide's position, or `None` if `origin` is already on
    /// the track.
    pub fn push_image(&mut self, src: String, alt: String, origin: String) -> Option<usize> {
        self.slides.retain(|s| !s.is_placeholder());
        if self.contains_origin(&origin) {
            return None;
        }
        self.slides.push(Slide {
            content: SlideContent::Image { src, alt, origin },
            hidden: false,
        });
        Some(self.slides.len() - 1)
    }

    pub fn push_placeholder(&mut self, message: String) {
        self.slides.push(Slide {
            content: SlideContent::Placeholder { message },
            hidden: false,
        });
    }

    /// Hide one slide; others are untouched.
    pub fn hide(&mut self, position: usize) {
        if let Some(slide) = self.slides.get_mut(position) {
            slide.hidden = true;
        }
    }

    pub fn offset_percent(&self) -> i64 {
        self.offset_percent
    }

    /// CSS transform applied to the track element.
    pub fn transform(&self) -> String {
        format!("translateX({}%)", self.offset_percent)
    }
}

/// Shared handle to a [`Track`].
#[derive(Debug, Clone)]
pub struct TrackHandle(Rc<RefCell<Track>>);

impl TrackHandle {
    pub fn new(track: Track) -> Self {
        Self(Rc::new(RefCell::new(track)))
    }

    pub fn borrow(&self) -> Ref<'_, Track> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Track> {
        self.0.borrow_mut()
    }
}

impl SlideTrack for TrackHandle {
    fn slide_count(&self) -> usize {
        self.borrow().visible_count()
    }

    fn set_offset_percent(&mut self, percent: i64) {
        self.borrow_mut().offset_percent = percent;
    }
}

/// Page regions that can carry a background image.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Hero,
    Trust,
    CallToAction,
    AboutHero,
    CommitmentItem(usize),
    ServiceCard(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Index,
    About,
}

/// Which elements exist on a page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub kind: PageKind,
    /// Categories with a `{category}-carousel` track, in gallery order.
    pub carousels: Vec<String>,
    pub regions: BTreeSet<Region>,
    pub commitment_items: usize,
}

impl PageLayout {
    /// Home page: hero, trust and call-to-action sections, one service card and
    /// one carousel per category.
    pub fn index(config: &GalleryConfig) -> Self {
        let mut regions: BTreeSet<Region> =
            [Region::Hero, Region::Trust, Region::CallToAction].into();
        regions.extend(
            config
                .categories
                .iter()
                .map(|c| Region::ServiceCard(c.clone())),
        );
        Self {
            kind: PageKind::Index,
            carousels: config.categories.clone(),
            regions,
            commitment_items: 0,
        }
    }

    /// About page: about hero, trust section, and the commitment list
    /// (consultation, design, production, delivery).
    pub fn about() -> Self {
        let mut regions: BTreeSet<Region> = [Region::AboutHero, Region::Trust].into();
        regions.extend((0..4).map(Region::CommitmentItem));
        Self {
            kind: PageKind::About,
            carousels: Vec::new(),
            regions,
            commitment_items: 4,
        }
    }
}

#[derive(Debug)]
pub struct Document {
    layout: PageLayout,
    tracks: BTreeMap<String, TrackHandle>,
    backgrounds: BTreeMap<Region, BackgroundStyle>,
    object_urls: Vec<Vec<u8>>,
    header_scrolled: bool,
}

const OBJECT_URL_PREFIX: &str = "blob:gallery/";

impl Document {
    pub fn from_layout(layout: PageLayout) -> Self {
        let tracks = layout
            .carousels
            .iter()
            .map(|c| {
                let id = naming::track_id(c);
                (id.clone(), TrackHandle::new(Track::new(id)))
            })
            .collect();
        Self {
            layout,
            tracks,
            backgrounds: BTreeMap::new(),
            object_urls: Vec::new(),
            header_scrolled: false,
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn kind(&self) -> PageKind {
        self.layout.kind
    }

    /// Look up a track by element id (`signs-carousel`).
    pub fn track(&self, id: &str) -> Option<TrackHandle> {
        self.tracks.get(id).cloned()
    }

    pub fn category_track(&self, category: &str) -> Option<TrackHandle> {
        self.track(&naming::track_id(category))
    }

    pub fn has_region(&self, region: &Region) -> bool {
        self.layout.regions.contains(region)
    }

    pub fn commitment_items(&self) -> usize {
        self.layout.commitment_items
    }

    /// Apply a background; returns `false` when the region is not on the page.
    pub fn set_background(&mut self, region: Region, style: BackgroundStyle) -> bool {
        if !self.has_region(&region) {
            return false;
        }
        self.backgrounds.insert(region, style);
        true
    }

    pub fn background(&self, region: &Region) -> Option<&BackgroundStyle> {
        self.backgrounds.get(region)
    }

    pub fn backgrounds(&self) -> impl Iterator<Item = (&Region, &BackgroundStyle)> {
        self.backgrounds.iter()
    }

    /// Track the page's scroll position; returns the header's new state.
    pub fn set_scroll(&mut self, scroll_y: f64) -> bool {
        self.header_scrolled = navigation::header_scrolled(scroll_y);
        self.header_scrolled
    }

    pub fn header_scrolled(&self) -> bool {
        self.header_scrolled
    }

    /// Register converted bytes and return a URL an image element can load.
    pub fn create_object_url(&mut self, bytes: Vec<u8>) -> String {
        self.object_urls.push(bytes);
        format!("{OBJECT_URL_PREFIX}{}", self.object_urls.len())
    }

    pub fn object_url_bytes(&self, url: &str) -> Option<&[u8]> {
        let index: usize = url.strip_prefix(OBJECT_URL_PREFIX)?.parse().ok()?;
        self.object_urls
            .get(index.checked_sub(1)?)
            .map(|b| b.as_slice())
    }
}
