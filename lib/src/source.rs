//! Where the reading side gets its documents from.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{Chainable, Result};

/// A store of documents addressed by relative path, such as
/// `docs/anchors/tdd.adoc` or `anchors.json`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches the document at `path` as text.
    async fn fetch(&self, path: &str) -> Result<String>;
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for std::sync::Arc<S> {
    async fn fetch(&self, path: &str) -> Result<String> {
        (**self).fetch(path).await
    }
}

/// Documents read from a local directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let file = self.root.join(path.trim_start_matches('/'));
        tokio::fs::read_to_string(&file).await.chain_with(|| error! {
            "failed to read document",
            "file path" => file.display(),
        })
    }
}

/// Documents served over HTTP under a base URL.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: String,
    http: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_client(base, reqwest::Client::new())
    }

    pub fn with_client(base: impl Into<String>, http: reqwest::Client) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        HttpSource { base, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        tracing::debug!(%url, "fetching document");

        let response = self.http.get(&url).send().await.chain_with(|| error! {
            "request failed",
            "url" => &url,
        })?;

        let status = response.status();
        if !status.is_success() {
            return err! {
                "server returned a non-success status",
                "url" => &url,
                "status" => status,
            };
        }

        response.text().await.chain_with(|| error! {
            "failed to read response body",
            "url" => &url,
        })
    }
}

/// Fetches the source document of anchor `id`. For any language other than
/// English the localized `{id}.{language}.adoc` is tried first; if it can't
/// be fetched the canonical document is used instead.
pub async fn fetch_entry_content<S>(source: &S, id: &str, language: &str) -> Result<String>
    where S: ContentSource + ?Sized
{
    if !language.is_empty() && language != "en" {
        let localized = format!("docs/anchors/{id}.{language}.adoc");
        match source.fetch(&localized).await {
            Ok(text) => return Ok(text),
            Err(e) => tracing::debug!(id, language, "no localized document: {}", e.message()),
        }
    }

    source.fetch(&crate::CatalogEntry::source_path_for(id)).await
}
