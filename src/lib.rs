//! # carousel-gallery
//!
//! Image carousels for a small product-showcase site. The filesystem is the
//! data source: each category folder under `images/` becomes a carousel, and
//! a few special folders feed section and service-card backgrounds.
//!
//! # Architecture: Build Time and Page Time
//!
//! ```text
//! build   images/      →  images/manifest.json   (filesystem → structured data)
//! page    manifest     →  populated document      (discovery → carousels)
//! ```
//!
//! The builder ([`scan`]) is a plain synchronous walk. The page runtime
//! ([`gallery`]) is single-threaded and async: per-category loads run
//! concurrently with `join_all`, and each category's track is only written
//! once its loads have resolved. When the manifest is missing the runtime
//! falls back to probing conventional filenames ([`probe`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Builder: walks the images directory and produces the manifest |
//! | [`types`] | The manifest and its entries, shared by builder and runtime |
//! | [`config`] | `gallery.toml` loading, validation and merging over stock defaults |
//! | [`naming`] | Filename conventions: hidden files, extensions, alt text, keys |
//! | [`source`] | Where bytes come from: local directory or deployed site |
//! | [`heic`] | HEIC conversion seam with timeouts |
//! | [`device`] | Device capability profile (touch, fixed backgrounds, motion) |
//! | [`probe`] | Filename probing when no manifest is available |
//! | [`discovery`] | Per-category entry selection, shuffle, load and apply |
//! | [`dom`] | Minimal document model: tracks, slides, background regions |
//! | [`carousel`] | Carousel state machine and registry |
//! | [`backgrounds`] | Section and service-card background planning |
//! | [`navigation`] | Nav controls, service-card targets, header state |
//! | [`gallery`] | Runtime entry point tying the above together |
//! | [`render`] | HTML snapshot of a populated document, via Maud |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Manifest First, Probing Second
//!
//! The builder's manifest is the fast path: one fetch, then exactly the files
//! that exist. Probing costs hundreds of requests per category and only runs
//! when the manifest is missing or lists nothing for the category.
//!
//! ## Failures Stay Local
//!
//! A broken image hides its own slide; a failed HEIC conversion drops its own
//! entry. Nothing aborts a category or the page. Failures are counted, and past
//! a threshold auto-play is switched off everywhere.
//!
//! ## Injected Collaborators
//!
//! The file server, the HEIC converter and the device profile are all passed
//! in. Tests run the whole runtime against in-memory fakes under a paused
//! tokio clock.

pub mod backgrounds;
pub mod carousel;
pub mod config;
pub mod device;
pub mod discovery;
pub mod dom;
pub mod gallery;
pub mod heic;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod probe;
pub mod render;
pub mod scan;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
