use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::catalog::{ANCHORS_FILE, CATEGORIES_FILE, ROLES_FILE};
use crate::catalog::{CatalogEntry, CategoryGroup, DatasetSnapshot, RoleGroup};
use crate::error::{Chainable, Result};
use crate::format::{Format, Json};
use crate::source::ContentSource;

/// Loads the published dataset once per session.
///
/// The three data files are fetched concurrently and the result is cached.
/// Callers racing on an empty cache wait on the first caller's fetch and then
/// share its result. A failed load caches nothing, so the next call retries.
pub struct DataLoader {
    source: Arc<dyn ContentSource>,
    prefix: String,
    cache: Mutex<Option<Arc<DatasetSnapshot>>>,
}

impl DataLoader {
    /// A loader reading the data files from `prefix` (such as `data`) in
    /// `source`. An empty prefix reads them from the root.
    pub fn new(source: Arc<dyn ContentSource>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        DataLoader { source, prefix, cache: Mutex::new(None) }
    }

    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    fn path(&self, file: &str) -> String {
        match self.prefix.is_empty() {
            true => file.to_string(),
            false => format!("{}/{file}", self.prefix),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let path = self.path(file);
        let text = self.source.fetch(&path).await?;
        Json::from_str(&text).chain_with(|| error! {
            "failed to parse data file",
            "path" => &path,
        })
    }

    /// The dataset, fetching it on first use.
    pub async fn load(&self) -> Result<Arc<DatasetSnapshot>> {
        let mut cache = self.cache.lock().await;
        if let Some(snapshot) = cache.as_ref() {
            return Ok(snapshot.clone());
        }

        let (entries, categories, roles) = futures::try_join!(
            self.fetch::<Vec<CatalogEntry>>(ANCHORS_FILE),
            self.fetch::<Vec<CategoryGroup>>(CATEGORIES_FILE),
            self.fetch::<Vec<RoleGroup>>(ROLES_FILE),
        ).chain(error!("failed to load the dataset"))?;

        tracing::info!(entries = entries.len(), "dataset loaded");
        let snapshot = Arc::new(DatasetSnapshot { entries, categories, roles });
        *cache = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The cached dataset, if it has been loaded.
    pub async fn cached(&self) -> Option<Arc<DatasetSnapshot>> {
        self.cache.lock().await.clone()
    }

    /// Drops the cached dataset.
    pub async fn reset(&self) {
        *self.cache.lock().await = None;
    }
}
