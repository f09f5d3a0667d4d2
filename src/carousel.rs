//! Carousel state machine.
//!
//! A carousel shows one slide of a track at a time. Its only state is the
//! current index and the auto-play mode; the slide count is re-read from the
//! track on every move because slides may be appended (or hidden) after the
//! carousel was built.
//!
//! ```text
//!               pointer_enter            disable_autoplay
//!   Running ───────────────────► Paused ─────────────────► Disabled
//!      ▲                           │                          ▲
//!      └──────── pointer_leave ────┘                          │
//!      └──────────────────────────────────────────────────────┘
//! ```
//!
//! Inert carousels (missing track, or no slides at construction time) start in
//! `Disabled` and never move.

use crate::device::DeviceProfile;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// The part of a track element a carousel needs.
pub trait SlideTrack {
    /// Number of slides currently taking part in rotation.
    fn slide_count(&self) -> usize;

    /// Horizontal translation of the track, in percent of one slide.
    fn set_offset_percent(&mut self, percent: i64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlay {
    Disabled,
    Running,
    Paused,
}

#[derive(Debug)]
pub struct Carousel<T> {
    id: String,
    track: Option<T>,
    current_index: usize,
    autoplay: AutoPlay,
}

impl<T: SlideTrack> Carousel<T> {
    /// Attach to a track. Missing or empty tracks give an inert carousel.
    pub fn new(id: impl Into<String>, track: Option<T>, profile: &DeviceProfile) -> Self {
        let id = id.into();
        let mut carousel = Self {
            id,
            track,
            current_index: 0,
            autoplay: AutoPlay::Disabled,
        };

        let count = carousel.slide_count();
        if carousel.track.is_none() {
            debug!(id = %carousel.id, "carousel track not found");
            return carousel;
        }
        if count == 0 {
            debug!(id = %carousel.id, "no slides for carousel");
            // Inert: a later go_to_slide may still pick up appended slides
            return carousel;
        }

        info!(id = %carousel.id, slides = count, "initializing carousel");
        carousel.go_to_slide(0);
        if profile.autoplay_allowed() {
            carousel.autoplay = AutoPlay::Running;
        }
        carousel
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn autoplay(&self) -> AutoPlay {
        self.autoplay
    }

    pub fn is_inert(&self) -> bool {
        self.track.is_none()
    }

    pub fn slide_count(&self) -> usize {
        self.track.as_ref().map(SlideTrack::slide_count).unwrap_or(0)
    }

    /// Move to `index`, wrapping modulo the current slide count.
    ///
    /// No-op when the track has no slides.
    pub fn go_to_slide(&mut self, index: i64) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        let count = track.slide_count();
        if count == 0 {
            return;
        }
        let wrapped = index.rem_euclid(count as i64);
        self.current_index = wrapped as usize;
        track.set_offset_percent(-wrapped * 100);
        debug!(id = %self.id, slide = self.current_index + 1, of = count, "carousel moved");
    }

    pub fn next(&mut self) {
        let count = self.slide_count();
        if count == 0 {
            return;
        }
        // Index may be stale if slides were hidden since the last move
        let next = (self.current_index % count + 1) % count;
        self.go_to_slide(next as i64);
    }

    pub fn prev(&mut self) {
        let count = self.slide_count();
        if count == 0 {
            return;
        }
        let prev = (self.current_index % count + count - 1) % count;
        self.go_to_slide(prev as i64);
    }

    /// One auto-play period elapsed.
    pub fn tick(&mut self) {
        if self.autoplay == AutoPlay::Running {
            self.next();
        }
    }

    pub fn pointer_enter(&mut self) {
        if self.autoplay == AutoPlay::Running {
            self.autoplay = AutoPlay::Paused;
        }
    }

    pub fn pointer_leave(&mut self) {
        if self.autoplay == AutoPlay::Paused {
            self.autoplay = AutoPlay::Running;
        }
    }

    pub fn disable_autoplay(&mut self) {
        self.autoplay = AutoPlay::Disabled;
    }
}

/// Category → carousel map owned by the gallery controller.
#[derive(Debug)]
pub struct CarouselRegistry<T> {
    carousels: BTreeMap<String, Carousel<T>>,
}

impl<T> Default for CarouselRegistry<T> {
    fn default() -> Self {
        Self {
            carousels: BTreeMap::new(),
        }
    }
}

impl<T: SlideTrack> CarouselRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, carousel: Carousel<T>) {
        self.carousels.insert(category.into(), carousel);
    }

    pub fn get(&self, category: &str) -> Option<&Carousel<T>> {
        self.carousels.get(category)
    }

    pub fn get_mut(&mut self, category: &str) -> Option<&mut Carousel<T>> {
        self.carousels.get_mut(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.carousels.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.carousels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carousels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Carousel<T>)> {
        self.carousels.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Advance every running carousel by one slide.
    pub fn tick_all(&mut self) {
        for carousel in self.carousels.values_mut() {
            carousel.tick();
        }
    }

    pub fn disable_autoplay_all(&mut self) {
        for carousel in self.carousels.values_mut() {
            carousel.disable_autoplay();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct FakeTrack {
        count: usize,
        offset: i64,
    }

    impl FakeTrack {
        fn with(count: usize) -> Self {
            Self { count, offset: 0 }
        }
    }

    impl SlideTrack for FakeTrack {
        fn slide_count(&self) -> usize {
            self.count
        }
        fn set_offset_percent(&mut self, percent: i64) {
            self.offset = percent;
        }
    }

    fn carousel(count: usize) -> Carousel<FakeTrack> {
        Carousel::new("t", Some(FakeTrack::with(count)), &DeviceProfile::desktop())
    }

    #[test]
    fn go_to_slide_wraps_modularly() {
        for n in 1..=7usize {
            let mut c = carousel(n);
            for i in -25i64..=25 {
                c.go_to_slide(i);
                let expected = ((i % n as i64) + n as i64) % n as i64;
                assert_eq!(c.current_index() as i64, expected, "i={i} n={n}");
                assert!(c.current_index() < n);
            }
        }
    }

    #[test]
    fn go_to_slide_sets_offset() {
        let mut c = carousel(4);
        c.go_to_slide(2);
        assert_eq!(c.track.as_ref().unwrap().offset, -200);
        c.go_to_slide(-1);
        assert_eq!(c.current_index(), 3);
        assert_eq!(c.track.as_ref().unwrap().offset, -300);
    }

    #[test]
    fn next_then_prev_round_trips() {
        for n in 1..=6usize {
            for start in 0..n {
                let mut c = carousel(n);
                c.go_to_slide(start as i64);
                c.next();
                c.prev();
                assert_eq!(c.current_index(), start, "n={n} start={start}");
            }
        }
    }

    #[test]
    fn next_n_times_returns_to_start() {
        let mut c = carousel(5);
        c.go_to_slide(3);
        for _ in 0..5 {
            c.next();
        }
        assert_eq!(c.current_index(), 3);
    }

    #[test]
    fn prev_from_zero_wraps_to_last() {
        let mut c = carousel(3);
        c.prev();
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn empty_track_is_inert() {
        let mut c = carousel(0);
        assert_eq!(c.autoplay(), AutoPlay::Disabled);
        c.next();
        c.prev();
        c.go_to_slide(5);
        c.tick();
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.track.as_ref().unwrap().offset, 0);
    }

    #[test]
    fn missing_track_is_inert() {
        let mut c: Carousel<FakeTrack> = Carousel::new("t", None, &DeviceProfile::desktop());
        assert!(c.is_inert());
        assert_eq!(c.autoplay(), AutoPlay::Disabled);
        c.next();
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn mobile_never_autoplays() {
        let c = Carousel::new("t", Some(FakeTrack::with(3)), &DeviceProfile::mobile());
        assert_eq!(c.autoplay(), AutoPlay::Disabled);
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn pointer_pauses_and_resumes() {
        let mut c = carousel(3);
        assert_eq!(c.autoplay(), AutoPlay::Running);

        c.pointer_enter();
        assert_eq!(c.autoplay(), AutoPlay::Paused);
        c.tick();
        assert_eq!(c.current_index(), 0);

        c.pointer_leave();
        c.tick();
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn pointer_leave_does_not_enable_disabled() {
        let mut c = carousel(3);
        c.disable_autoplay();
        c.pointer_enter();
        c.pointer_leave();
        assert_eq!(c.autoplay(), AutoPlay::Disabled);
    }

    #[test]
    fn shrinking_track_keeps_index_in_range() {
        let mut c = carousel(5);
        c.go_to_slide(4);
        c.track.as_mut().unwrap().count = 2;
        c.next();
        assert!(c.current_index() < 2);
        c.prev();
        assert!(c.current_index() < 2);
    }

    #[test]
    fn registry_ticks_and_disables_all() {
        let mut registry = CarouselRegistry::new();
        registry.insert("signs", carousel(3));
        registry.insert("decor", carousel(2));

        registry.tick_all();
        assert_eq!(registry.get("signs").unwrap().current_index(), 1);
        assert_eq!(registry.get("decor").unwrap().current_index(), 1);

        registry.disable_autoplay_all();
        registry.tick_all();
        assert_eq!(registry.get("signs").unwrap().current_index(), 1);
        assert!(registry
            .iter()
            .all(|(_, c)| c.autoplay() == AutoPlay::Disabled));
    }
}
