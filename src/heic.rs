//! HEIC/HEIF conversion.
//!
//! Browsers cannot show HEIC, so these entries go through an external
//! converter before they can back a slide. The converter is opaque and
//! unreliable; every call is bounded:
//!
//! ```text
//! fetch bytes ──(fetch timeout, 10 s)──► non-empty? ──► convert ──(convert timeout, 15 s)──► first output
//! ```
//!
//! Any failure along the way is a [`HeicError`]. Callers treat it as "drop
//! this slide", never as a category failure.

use crate::config::HeicConfig;
use crate::source::{AssetSource, FetchError};
use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

/// Output format requested from the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
}

impl TargetFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub bytes: Vec<u8>,
    pub target: TargetFormat,
    pub quality: f32,
}

/// Converters return either one image or a list whose first element is the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutput {
    Single(Vec<u8>),
    Many(Vec<Vec<u8>>),
}

impl ConversionOutput {
    /// The converted image, if the converter produced a non-empty one.
    pub fn into_first(self) -> Option<Vec<u8>> {
        let bytes = match self {
            ConversionOutput::Single(bytes) => bytes,
            ConversionOutput::Many(list) => list.into_iter().next()?,
        };
        (!bytes.is_empty()).then_some(bytes)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("No HEIC converter available")]
    Unavailable,
    #[error("Conversion failed: {0}")]
    Failed(String),
}

#[async_trait(?Send)]
pub trait HeicConverter {
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionOutput, ConvertError>;
}

/// Converter used when no conversion library is wired in. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableConverter;

#[async_trait(?Send)]
impl HeicConverter for UnavailableConverter {
    async fn convert(&self, _request: ConversionRequest) -> Result<ConversionOutput, ConvertError> {
        Err(ConvertError::Unavailable)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeicError {
    #[error("HEIC skipped on touch-primary device")]
    SkippedOnMobile,
    #[error("Timed out fetching HEIC source")]
    FetchTimeout,
    #[error("Could not fetch HEIC source: {0}")]
    Fetch(#[from] FetchError),
    #[error("HEIC source is empty")]
    EmptyPayload,
    #[error("HEIC conversion timed out")]
    ConvertTimeout,
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("Converter returned no image")]
    EmptyResult,
}

/// Fetch and convert one HEIC asset into displayable bytes.
pub async fn convert_heic(
    source: &dyn AssetSource,
    converter: &dyn HeicConverter,
    path: &str,
    config: &HeicConfig,
) -> Result<Vec<u8>, HeicError> {
    let bytes = timeout(config.fetch_timeout(), source.fetch(path))
        .await
        .map_err(|_| HeicError::FetchTimeout)??;
    if bytes.is_empty() {
        return Err(HeicError::EmptyPayload);
    }
    debug!(path, size = bytes.len(), "fetched HEIC source");

    let request = ConversionRequest {
        bytes,
        target: TargetFormat::Jpeg,
        quality: config.quality,
    };
    let output = timeout(config.convert_timeout(), converter.convert(request))
        .await
        .map_err(|_| HeicError::ConvertTimeout)??;

    output.into_first().ok_or(HeicError::EmptyResult)
}
