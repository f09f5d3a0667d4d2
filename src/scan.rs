//! Manifest builder.
//!
//! Scans the fixed set of asset directories under the images root and
//! produces the [`Manifest`] the gallery runtime reads on page load.
//!
//! ## Directory Structure
//!
//! ```text
//! images/                          # Images root
//! ├── gallery.toml                 # Optional configuration
//! ├── manifest.json                # Output of this module
//! ├── signs/                       # Product category → "signs"
//! │   ├── a.png
//! │   ├── b.jpg
//! │   ├── ._b.jpg                  # macOS metadata, skipped
//! │   └── notes.txt                # Not an image, skipped
//! ├── service-signs/               # Service background → "signs-bg"
//! │   └── storefront.jpg
//! └── Misc/                        # Section backgrounds → "misc"
//!     └── hero.webp
//! ```
//!
//! ## Rules
//!
//! - A file is listed iff it is not hidden and its extension (any case) is in
//!   the configured allow-list.
//! - Filenames are sorted lexicographically, giving a stable base order the
//!   runtime later shuffles.
//! - A missing directory yields an empty list. Any other failure to read the
//!   directory also yields an empty list but is recorded as a [`ScanIssue`].
//! - An entry that cannot be inspected is skipped and recorded; the rest of
//!   its directory is still listed. The builder is best-effort and always
//!   produces a manifest.

use crate::config::GalleryConfig;
use crate::naming;
use crate::types::{ImageEntry, Manifest};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error writing {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a manifest key represents; drives the summary wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Product,
    ServiceBackground,
    Misc,
}

/// A non-fatal problem met while scanning: an unreadable directory, or one
/// entry inside a directory that was otherwise listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    pub path: PathBuf,
    pub message: String,
}

/// One scanned manifest key.
#[derive(Debug, Clone)]
pub struct SectionSummary {
    pub key: String,
    pub kind: SectionKind,
    pub count: usize,
}

/// Result of a builder run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub sections: Vec<SectionSummary>,
    pub issues: Vec<ScanIssue>,
}

impl BuildReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// A directory to scan and the manifest key it feeds.
struct SectionSource {
    key: String,
    kind: SectionKind,
    dir_name: String,
    label: String,
}

fn section_sources(config: &GalleryConfig) -> Vec<SectionSource> {
    let products = config.categories.iter().map(|c| SectionSource {
        key: c.clone(),
        kind: SectionKind::Product,
        dir_name: c.clone(),
        label: c.clone(),
    });
    let services = config.service_categories.iter().map(|s| {
        let key = naming::background_key(s);
        SectionSource {
            label: key.clone(),
            key,
            kind: SectionKind::ServiceBackground,
            dir_name: s.clone(),
        }
    });
    let misc = std::iter::once(SectionSource {
        key: naming::MISC_KEY.to_string(),
        kind: SectionKind::Misc,
        dir_name: config.misc_dir.clone(),
        label: config.misc_label.clone(),
    });
    products.chain(services).chain(misc).collect()
}

/// Scan every configured directory under `root` into a manifest.
///
/// Directories are scanned in parallel; the manifest keeps configuration order.
pub fn build_manifest(root: &Path, config: &GalleryConfig) -> BuildReport {
    let sources = section_sources(config);

    let scanned: Vec<(Vec<ImageEntry>, Vec<ScanIssue>)> = sources
        .par_iter()
        .map(|source| scan_section(root, source, config))
        .collect();

    let mut manifest = Manifest::new();
    let mut sections = Vec::with_capacity(sources.len());
    let mut issues = Vec::new();

    for (source, (entries, section_issues)) in sources.into_iter().zip(scanned) {
        sections.push(SectionSummary {
            key: source.key.clone(),
            kind: source.kind,
            count: entries.len(),
        });
        manifest.insert(source.key, entries);
        issues.extend(section_issues);
    }

    BuildReport {
        manifest,
        sections,
        issues,
    }
}

fn scan_section(
    root: &Path,
    source: &SectionSource,
    config: &GalleryConfig,
) -> (Vec<ImageEntry>, Vec<ScanIssue>) {
    let dir = root.join(&source.dir_name);
    match list_image_files(&dir, config) {
        Ok(Listing { names, issues }) => {
            debug!(dir = %dir.display(), count = names.len(), "scanned image directory");
            let entries = names
                .iter()
                .map(|file| {
                    ImageEntry::new(
                        format!("{}/{}/{}", config.url_prefix, source.dir_name, file),
                        naming::alt_text(&source.label, file),
                    )
                })
                .collect();
            (entries, issues)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => (Vec::new(), Vec::new()),
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "could not scan image directory");
            let issue = ScanIssue {
                path: dir,
                message: err.to_string(),
            };
            (Vec::new(), vec![issue])
        }
    }
}

/// Image names found in one directory, plus the entries that were skipped.
struct Listing {
    names: Vec<String>,
    issues: Vec<ScanIssue>,
}

/// Sorted names of the image files directly inside `dir`.
///
/// Only an unreadable `dir` fails the listing. An entry that cannot be
/// inspected (a dangling symlink, say) or whose name is not UTF-8 is skipped
/// and reported, and its siblings are still listed.
fn list_image_files(dir: &Path, config: &GalleryConfig) -> io::Result<Listing> {
    let meta = fs::metadata(dir)?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut listing = Listing {
        names: Vec::new(),
        issues: Vec::new(),
    };
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                listing.issues.push(ScanIssue {
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "skipping file with a non-UTF-8 name");
            continue;
        };
        if is_listed_image(name, config) {
            listing.names.push(name.to_string());
        }
    }

    listing.names.sort();
    Ok(listing)
}

/// The builder's filter: not hidden, allowed extension.
pub fn is_listed_image(filename: &str, config: &GalleryConfig) -> bool {
    if naming::is_hidden(filename) {
        return false;
    }
    naming::extension(filename)
        .map(|ext| config.allows_extension(ext))
        .unwrap_or(false)
}

/// Path of the manifest file for an images root.
pub fn manifest_path(root: &Path, config: &GalleryConfig) -> PathBuf {
    root.join(&config.manifest_file)
}

/// Write the manifest as pretty JSON, returning the path written.
pub fn write_manifest(
    root: &Path,
    config: &GalleryConfig,
    manifest: &Manifest,
) -> Result<PathBuf, BuildError> {
    let path = manifest_path(root, config);
    let json = manifest.to_json_pretty()?;
    fs::write(&path, json).map_err(|source| BuildError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
