//! Asset sources: where the runtime fetches the manifest and image bytes.
//!
//! The static file server is an external collaborator, so the runtime only
//! sees the [`AssetSource`] trait. Two implementations ship:
//!
//! | Source | Use |
//! |---|---|
//! | [`FsSource`] | Local site directory (CLI preview, tests) |
//! | [`HttpSource`] | A deployed site, via `reqwest` |
//!
//! Paths are the site-relative URLs found in the manifest
//! (`images/signs/a.png`).

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("HTTP {status} for {path}")]
    Status { path: String, status: u16 },
    #[error("Transport error for {path}: {message}")]
    Transport { path: String, message: String },
}

/// Fetches bytes by site-relative path.
#[async_trait(?Send)]
pub trait AssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// Serves files from a local site root.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a URL path under the root. Paths escaping the root resolve to nothing.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| self.root.join(relative))
    }
}

#[async_trait(?Send)]
impl AssetSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let file = self
            .resolve(path)
            .ok_or_else(|| FetchError::NotFound(path.to_string()))?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.to_string()))
            }
            Err(e) => Err(FetchError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Fetches from a deployed site over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpSource {
    /// `base` is the site root; a trailing slash is added when missing so that
    /// relative paths resolve underneath it.
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = reqwest::Url::parse(&normalized).map_err(|e| FetchError::Transport {
            path: base.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    pub fn url_for(&self, path: &str) -> Result<reqwest::Url, FetchError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait(?Send)]
impl AssetSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        };
        let url = self.url_for(path)?;
        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fs_source_reads_relative_paths() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("images/signs")).unwrap();
        std::fs::write(tmp.path().join("images/signs/a.png"), b"png").unwrap();

        let source = FsSource::new(tmp.path());
        assert_eq!(source.fetch("images/signs/a.png").await.unwrap(), b"png");
        assert_eq!(source.fetch("/images/signs/a.png").await.unwrap(), b"png");
    }

    #[tokio::test]
    async fn fs_source_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let source = FsSource::new(tmp.path());
        assert_eq!(
            source.fetch("images/none.jpg").await,
            Err(FetchError::NotFound("images/none.jpg".to_string()))
        );
    }

    #[tokio::test]
    async fn fs_source_refuses_parent_traversal() {
        let tmp = TempDir::new().unwrap();
        let inner = tmp.path().join("site");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(tmp.path().join("secret.txt"), b"x").unwrap();

        let source = FsSource::new(&inner);
        assert!(matches!(
            source.fetch("../secret.txt").await,
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn http_source_joins_under_base() {
        let source = HttpSource::new("https://example.com/shop").unwrap();
        assert_eq!(
            source.url_for("images/manifest.json").unwrap().as_str(),
            "https://example.com/shop/images/manifest.json"
        );
    }

    #[test]
    fn http_source_rejects_bad_base() {
        assert!(HttpSource::new("not a url").is_err());
    }
}
