//! Per-category image discovery.
//!
//! Discovery runs in two halves so that categories can load concurrently
//! while the document stays single-owner:
//!
//! 1. [`Discovery::load_category`] (async): pick the entries (manifest first,
//!    filename probing as the fallback), shuffle them, then fetch every entry
//!    concurrently. Each entry resolves to a [`LoadOutcome`].
//! 2. [`apply_category`] (sync): write the outcomes into the category's track,
//!    minting object URLs for converted HEIC bytes.
//!
//! | Entry | Outcome |
//! |---|---|
//! | HEIC on a touch-primary device | dropped, never converted |
//! | HEIC, converted | slide backed by an object URL |
//! | HEIC, any conversion failure | dropped |
//! | other, decodes | slide backed by the path |
//! | other, does not decode | slide added, then hidden |
//!
//! A category for which nothing was found at all (no manifest entries, no
//! probe hits) gets one placeholder slide.

use crate::config::GalleryConfig;
use crate::device::DeviceProfile;
use crate::dom::Document;
use crate::heic::{self, HeicConverter, HeicError};
use crate::naming;
use crate::probe;
use crate::source::{AssetSource, FetchError};
use crate::types::{ImageEntry, Manifest};
use futures::future::join_all;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlideError {
    #[error("Could not load image: {0}")]
    Fetch(#[from] FetchError),
    #[error("Image does not decode: {0}")]
    Undecodable(String),
    #[error("Image has zero size")]
    ZeroSize,
}

#[derive(Error, Debug)]
pub enum ManifestLoadError {
    #[error("Manifest unavailable: {0}")]
    Fetch(#[from] FetchError),
    #[error("Manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fully decode `bytes` and return the image size.
///
/// Header-only reads accept files whose pixel data is truncated or corrupt,
/// which a browser would still fail to show, so the whole image is decoded.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), SlideError> {
    let image = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SlideError::Undecodable(e.to_string()))?
        .decode()
        .map_err(|e| SlideError::Undecodable(e.to_string()))?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(SlideError::ZeroSize);
    }
    Ok((width, height))
}

/// Site-relative path of the manifest (`images/manifest.json`).
pub fn manifest_url(config: &GalleryConfig) -> String {
    format!("{}/{}", config.url_prefix, config.manifest_file)
}

pub async fn load_manifest(
    source: &dyn AssetSource,
    config: &GalleryConfig,
) -> Result<Manifest, ManifestLoadError> {
    let bytes = source.fetch(&manifest_url(config)).await?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(Manifest::from_json(&text)?)
}

/// Where a category's entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    Manifest,
    Probe,
    /// Nothing listed and probing disabled or empty.
    Nothing,
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// Loaded fine; the slide shows the path.
    Shown,
    /// HEIC converted to displayable bytes.
    Converted(Vec<u8>),
    /// Fetched or decoded badly; the slide is added and hidden.
    Broken(SlideError),
    /// Never added.
    Dropped(HeicError),
}

#[derive(Debug)]
pub struct LoadedEntry {
    pub entry: ImageEntry,
    pub outcome: LoadOutcome,
}

#[derive(Debug)]
pub struct CategoryLoad {
    pub category: String,
    pub origin: EntryOrigin,
    /// In shuffled order.
    pub entries: Vec<LoadedEntry>,
}

/// What [`apply_category`] did to a track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryOutcome {
    pub added: usize,
    pub hidden: usize,
    pub dropped: usize,
    pub duplicates: usize,
    pub placeholder: bool,
    /// Failures worth counting against the error budget.
    pub errors: usize,
}

/// Borrowed collaborators for one initialization pass.
pub struct Discovery<'a> {
    pub source: &'a dyn AssetSource,
    pub converter: &'a dyn HeicConverter,
    pub config: &'a GalleryConfig,
    pub profile: &'a DeviceProfile,
}

impl Discovery<'_> {
    /// Entries for one category, shuffled with `seed`.
    pub async fn load_category(
        &self,
        category: &str,
        manifest: Option<&Manifest>,
        seed: u64,
    ) -> CategoryLoad {
        let (origin, mut entries) = self.choose_entries(category, manifest).await;
        let mut rng = StdRng::seed_from_u64(seed);
        entries.shuffle(&mut rng);

        let outcomes = join_all(entries.iter().map(|entry| self.load_entry(entry))).await;
        let entries = entries
            .into_iter()
            .zip(outcomes)
            .map(|(entry, outcome)| LoadedEntry { entry, outcome })
            .collect();

        CategoryLoad {
            category: category.to_string(),
            origin,
            entries,
        }
    }

    async fn choose_entries(
        &self,
        category: &str,
        manifest: Option<&Manifest>,
    ) -> (EntryOrigin, Vec<ImageEntry>) {
        if let Some(listed) = manifest.map(|m| m.entries(category)).filter(|e| !e.is_empty()) {
            debug!(category, count = listed.len(), "using manifest entries");
            return (EntryOrigin::Manifest, listed.to_vec());
        }
        if !self.config.probe.enabled {
            debug!(category, "nothing listed and probing disabled");
            return (EntryOrigin::Nothing, Vec::new());
        }
        info!(category, "manifest has no entries, probing filenames");
        let found = probe::probe_category(
            self.source,
            &self.config.url_prefix,
            category,
            self.config.probe.max_index,
        )
        .await;
        if found.is_empty() {
            (EntryOrigin::Nothing, found)
        } else {
            (EntryOrigin::Probe, found)
        }
    }

    async fn load_entry(&self, entry: &ImageEntry) -> LoadOutcome {
        if naming::is_heic(&entry.path) {
            if !self.profile.converts_heic() {
                return LoadOutcome::Dropped(HeicError::SkippedOnMobile);
            }
            return match heic::convert_heic(self.source, self.converter, &entry.path, &self.config.heic)
                .await
            {
                Ok(bytes) => LoadOutcome::Converted(bytes),
                Err(e) => LoadOutcome::Dropped(e),
            };
        }

        let loaded = match self.source.fetch(&entry.path).await {
            Ok(bytes) => image_dimensions(&bytes).map(|_| ()),
            Err(e) => Err(SlideError::from(e)),
        };
        match loaded {
            Ok(()) => LoadOutcome::Shown,
            Err(e) => LoadOutcome::Broken(e),
        }
    }
}

/// Instructional text shown when a category has no images.
pub fn placeholder_message(config: &GalleryConfig, category: &str) -> String {
    format!(
        "Add images to {}/{}/ folder. Supported: image1.jpg, {}1.jpg, 1.jpg, etc. \
         Or run: carousel-gallery build",
        config.url_prefix, category, category
    )
}

/// Write a category's load results into its track.
pub fn apply_category(
    document: &mut Document,
    config: &GalleryConfig,
    load: CategoryLoad,
) -> CategoryOutcome {
    let mut outcome = CategoryOutcome::default();
    let Some(track) = document.category_track(&load.category) else {
        warn!(category = %load.category, "carousel track not found");
        return outcome;
    };

    for LoadedEntry { entry, outcome: result } in load.entries {
        let ImageEntry { path, alt } = entry;
        match result {
            LoadOutcome::Shown => {
                if track.borrow_mut().push_image(path.clone(), alt, path.clone()).is_some() {
                    debug!(category = %load.category, path = %path, "added image");
                    outcome.added += 1;
                } else {
                    outcome.duplicates += 1;
                }
            }
            LoadOutcome::Converted(bytes) => {
                if track.borrow().contains_origin(&path) {
                    outcome.duplicates += 1;
                    continue;
                }
                let url = document.create_object_url(bytes);
                track.borrow_mut().push_image(url, alt, path.clone());
                info!(category = %load.category, path = %path, "converted HEIC image");
                outcome.added += 1;
            }
            LoadOutcome::Broken(error) => {
                let position = track.borrow_mut().push_image(path.clone(), alt, path.clone());
                match position {
                    Some(position) => {
                        track.borrow_mut().hide(position);
                        warn!(category = %load.category, path = %path, %error, "failed to load image");
                        outcome.hidden += 1;
                        outcome.errors += 1;
                    }
                    None => outcome.duplicates += 1,
                }
            }
            LoadOutcome::Dropped(HeicError::SkippedOnMobile) => {
                info!(category = %load.category, path = %path, "skipping HEIC on mobile");
                outcome.dropped += 1;
            }
            LoadOutcome::Dropped(error) => {
                warn!(category = %load.category, path = %path, %error, "HEIC image dropped");
                outcome.dropped += 1;
                outcome.errors += 1;
            }
        }
    }

    let needs_placeholder = load.origin == EntryOrigin::Nothing && track.borrow().is_empty();
    if needs_placeholder {
        track
            .borrow_mut()
            .push_placeholder(placeholder_message(config, &load.category));
        outcome.placeholder = true;
        info!(category = %load.category, "no images found, showing placeholder");
    }
    outcome
}
