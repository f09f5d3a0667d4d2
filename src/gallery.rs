//! Gallery controller: the runtime entry point.
//!
//! A [`Gallery`] owns everything one page needs: the document model, the
//! carousel registry, the asset source and HEIC converter, and the error
//! budget. [`Gallery::initialize`] runs the whole page setup:
//!
//! ```text
//! fetch manifest (once)
//!   ├── section + service-card backgrounds
//!   └── per-category discovery ──(join_all)──► apply to tracks
//! settle delay
//! construct carousels (mobile: staggered)
//! ```
//!
//! Failures never escape. Each one is logged and counted; once the count
//! passes the configured threshold, auto-play is switched off on every
//! carousel, including ones constructed later.

use crate::backgrounds;
use crate::carousel::{Carousel, CarouselRegistry};
use crate::config::GalleryConfig;
use crate::device::DeviceProfile;
use crate::discovery::{self, CategoryOutcome, Discovery, ManifestLoadError};
use crate::dom::{Document, PageLayout, TrackHandle};
use crate::heic::HeicConverter;
use crate::navigation::{Direction, NavControl};
use crate::naming;
use crate::source::{AssetSource, FetchError};
use crate::types::Manifest;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use tokio::time::{Instant, interval_at, sleep};
use tracing::{debug, error, info, warn};

/// Counts failures and trips once the count exceeds the threshold.
#[derive(Debug, Clone)]
pub struct ErrorBudget {
    threshold: u32,
    count: u32,
    tripped: bool,
}

impl ErrorBudget {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            count: 0,
            tripped: false,
        }
    }

    /// Add `n` failures. Returns `true` only on the call that trips the budget.
    pub fn record(&mut self, n: u32) -> bool {
        self.count = self.count.saturating_add(n);
        if !self.tripped && self.count > self.threshold {
            self.tripped = true;
            return true;
        }
        false
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }
}

/// Summary of one [`Gallery::initialize`] run.
#[derive(Debug, Clone, Default)]
pub struct InitReport {
    pub manifest_found: bool,
    pub backgrounds_applied: usize,
    /// Per category, in configured order.
    pub categories: Vec<(String, CategoryOutcome)>,
    pub carousels: usize,
    pub errors: u32,
    pub autoplay_disabled: bool,
}

pub struct Gallery {
    config: GalleryConfig,
    profile: DeviceProfile,
    source: Box<dyn AssetSource>,
    converter: Box<dyn HeicConverter>,
    document: Document,
    carousels: CarouselRegistry<TrackHandle>,
    errors: ErrorBudget,
    rng: StdRng,
}

impl Gallery {
    pub fn new(
        config: GalleryConfig,
        profile: DeviceProfile,
        layout: PageLayout,
        source: Box<dyn AssetSource>,
        converter: Box<dyn HeicConverter>,
    ) -> Self {
        let errors = ErrorBudget::new(config.errors.threshold);
        Self {
            config,
            profile,
            source,
            converter,
            document: Document::from_layout(layout),
            carousels: CarouselRegistry::new(),
            errors,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the shuffle order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn carousels(&self) -> &CarouselRegistry<TrackHandle> {
        &self.carousels
    }

    pub fn carousel(&self, category: &str) -> Option<&Carousel<TrackHandle>> {
        self.carousels.get(category)
    }

    pub fn errors(&self) -> &ErrorBudget {
        &self.errors
    }

    /// Categories whose track exists on this page, in configured order.
    fn page_categories(&self) -> Vec<String> {
        self.config
            .categories
            .iter()
            .filter(|c| self.document.category_track(c).is_some())
            .cloned()
            .collect()
    }

    pub async fn initialize(&mut self) -> InitReport {
        let mut report = InitReport::default();

        let manifest = match discovery::load_manifest(self.source.as_ref(), &self.config).await {
            Ok(manifest) => Some(manifest),
            Err(ManifestLoadError::Fetch(FetchError::NotFound(path))) => {
                info!(%path, "manifest not found, falling back to filename probing");
                None
            }
            Err(e) => {
                warn!(error = %e, "could not load manifest");
                None
            }
        };
        report.manifest_found = manifest.is_some();

        if let Some(manifest) = &manifest {
            report.backgrounds_applied = self.apply_backgrounds(manifest);
        }

        let categories = self.page_categories();
        let seeds: Vec<u64> = categories.iter().map(|_| self.rng.r#gen()).collect();
        let loads = {
            let discovery = Discovery {
                source: self.source.as_ref(),
                converter: self.converter.as_ref(),
                config: &self.config,
                profile: &self.profile,
            };
            let manifest = manifest.as_ref();
            join_all(
                categories
                    .iter()
                    .zip(seeds)
                    .map(|(category, seed)| discovery.load_category(category, manifest, seed)),
            )
            .await
        };

        for load in loads {
            let category = load.category.clone();
            let outcome = discovery::apply_category(&mut self.document, &self.config, load);
            self.record_errors(outcome.errors);
            report.categories.push((category, outcome));
        }

        sleep(self.settle_delay()).await;
        report.carousels = self.construct_carousels(&categories).await;
        report.errors = self.errors.count();
        report.autoplay_disabled = self.errors.is_tripped();
        report
    }

    fn apply_backgrounds(&mut self, manifest: &Manifest) -> usize {
        let plan = backgrounds::plan_section_backgrounds(
            manifest.entries(naming::MISC_KEY),
            &self.profile,
            self.document.commitment_items(),
        );
        let mut applied = backgrounds::apply(&mut self.document, plan);

        let plan = backgrounds::plan_service_card_backgrounds(manifest, &self.config.categories);
        applied += backgrounds::apply(&mut self.document, plan);
        applied
    }

    fn settle_delay(&self) -> Duration {
        let ms = if self.profile.is_mobile() {
            self.config.carousel.mobile_settle_ms
        } else {
            self.config.carousel.settle_ms
        };
        Duration::from_millis(ms)
    }

    /// Build carousels for populated tracks that have none yet.
    async fn construct_carousels(&mut self, categories: &[String]) -> usize {
        let mut built = 0;
        for category in categories {
            if self.carousels.contains(category) {
                continue;
            }
            let Some(track) = self.document.category_track(category) else {
                continue;
            };
            if track.borrow().is_empty() {
                debug!(category = %category, "no images found");
                continue;
            }
            if self.profile.is_mobile() {
                sleep(Duration::from_millis(self.config.carousel.mobile_stagger_ms)).await;
            }
            self.register(category, track);
            built += 1;
        }
        built
    }

    fn register(&mut self, category: &str, track: TrackHandle) {
        let mut carousel = Carousel::new(naming::track_id(category), Some(track), &self.profile);
        if self.errors.is_tripped() {
            carousel.disable_autoplay();
        }
        self.carousels.insert(category, carousel);
    }

    /// Construct carousels for tracks that gained slides since the last pass.
    pub fn reinitialize(&mut self) -> usize {
        let mut built = 0;
        for category in self.page_categories() {
            if self.carousels.contains(&category) {
                continue;
            }
            let Some(track) = self.document.category_track(&category) else {
                continue;
            };
            if track.borrow().is_empty() {
                continue;
            }
            self.register(&category, track);
            built += 1;
        }
        built
    }

    /// Count failures against the budget, tripping the breaker when exceeded.
    pub fn record_errors(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        if self.errors.record(n) {
            error!(
                errors = self.errors.count(),
                threshold = self.config.errors.threshold,
                "too many errors, disabling auto-play"
            );
        }
        if self.errors.is_tripped() {
            self.carousels.disable_autoplay_all();
        }
    }

    /// Dispatch a prev/next button press. Unknown categories are ignored.
    pub fn handle_nav(&mut self, control: &NavControl) -> bool {
        let Some(carousel) = self.carousels.get_mut(&control.category) else {
            debug!(category = %control.category, "no carousel for nav control");
            return false;
        };
        match control.direction {
            Direction::Prev => carousel.prev(),
            Direction::Next => carousel.next(),
        }
        true
    }

    /// Page scroll event. Returns whether the header is now compact.
    pub fn handle_scroll(&mut self, scroll_y: f64) -> bool {
        self.document.set_scroll(scroll_y)
    }

    pub fn pointer_enter(&mut self, category: &str) {
        if let Some(carousel) = self.carousels.get_mut(category) {
            carousel.pointer_enter();
        }
    }

    pub fn pointer_leave(&mut self, category: &str) {
        if let Some(carousel) = self.carousels.get_mut(category) {
            carousel.pointer_leave();
        }
    }

    /// Advance every running carousel once per auto-play period until
    /// `shutdown` resolves.
    pub async fn run_autoplay<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let period = self.config.carousel.autoplay_period();
        let mut ticker = interval_at(Instant::now() + period, period);
        let mut shutdown = pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.carousels.tick_all(),
            }
        }
    }
}
