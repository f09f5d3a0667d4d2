//! Shared test utilities for the carousel-gallery test suite.
//!
//! Provides in-memory fakes for the runtime's external collaborators, tiny
//! real image fixtures, and lookup helpers that panic with the available keys.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = MemorySource::new()
//!     .with_file("images/signs/a.png", png_bytes(2, 2))
//!     .with_status("images/signs/b.heic", 500);
//! let converter = ScriptedConverter::single(b"jpeg".to_vec());
//!
//! // ... run discovery ...
//! assert_eq!(source.fetch_count("images/signs/a.png"), 1);
//! assert_eq!(converter.calls(), 0);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};

use crate::heic::{ConversionOutput, ConversionRequest, ConvertError, HeicConverter, TargetFormat};
use crate::scan::{BuildReport, SectionSummary};
use crate::source::{AssetSource, FetchError};

// =========================================================================
// Image fixtures
// =========================================================================

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// A real, decodable PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// A real, decodable JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

// =========================================================================
// In-memory asset source
// =========================================================================

/// Asset source backed by a map. Clones share fetch counters, so a test can
/// keep a clone after handing the source to a `Gallery`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    statuses: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    fetches: Rc<RefCell<HashMap<String, usize>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), bytes);
        self
    }

    /// Answer `path` with a non-success HTTP status.
    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.statuses.insert(path.to_string(), status);
        self
    }

    /// Delay the response for `path`.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.borrow().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.borrow().values().sum()
    }
}

#[async_trait(?Send)]
impl AssetSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let path = path.trim_start_matches('/');
        *self
            .fetches
            .borrow_mut()
            .entry(path.to_string())
            .or_default() += 1;

        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(status) = self.statuses.get(path) {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: *status,
            });
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

// =========================================================================
// Scripted HEIC converter
// =========================================================================

/// Converter that always answers with the same scripted result.
#[derive(Debug)]
pub struct ScriptedConverter {
    result: Result<ConversionOutput, ConvertError>,
    delay: Option<Duration>,
    calls: Cell<usize>,
    last_request: RefCell<Option<(TargetFormat, f32)>>,
}

impl ScriptedConverter {
    pub fn new(result: Result<ConversionOutput, ConvertError>) -> Self {
        Self {
            result,
            delay: None,
            calls: Cell::new(0),
            last_request: RefCell::new(None),
        }
    }

    pub fn single(bytes: Vec<u8>) -> Self {
        Self::new(Ok(ConversionOutput::Single(bytes)))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Target format and quality of the most recent request.
    pub fn last_request(&self) -> Option<(TargetFormat, f32)> {
        *self.last_request.borrow()
    }
}

#[async_trait(?Send)]
impl HeicConverter for ScriptedConverter {
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionOutput, ConvertError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_request.borrow_mut() = Some((request.target, request.quality));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

// =========================================================================
// Report lookups: panic with the available keys on miss
// =========================================================================

/// Find a scanned section by manifest key. Panics if not found.
pub fn find_section<'a>(report: &'a BuildReport, key: &str) -> &'a SectionSummary {
    report
        .sections
        .iter()
        .find(|s| s.key == key)
        .unwrap_or_else(|| {
            let keys: Vec<&str> = report.sections.iter().map(|s| s.key.as_str()).collect();
            panic!("section '{key}' not found. Available: {keys:?}")
        })
}
