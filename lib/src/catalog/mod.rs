mod extract;
mod derive;
mod entities;

pub use extract::*;
pub use derive::*;
pub use entities::decode_html_entities;

use serde::{Deserialize, Serialize};

/// One anchor, as extracted from `docs/anchors/{id}.adoc`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default)]
    pub proponents: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "filePath")]
    pub source_path: String,
}

/// Anchors sharing a category, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "anchors")]
    pub member_entry_ids: Vec<String>,
}

/// Anchors sharing a role, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroup {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "anchors")]
    pub member_entry_ids: Vec<String>,
}

/// The dataset as fetched by readers of the published site. Never patched:
/// a reload replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSnapshot {
    pub entries: Vec<CatalogEntry>,
    pub categories: Vec<CategoryGroup>,
    pub roles: Vec<RoleGroup>,
}

impl CatalogEntry {
    /// The path of the canonical source document of anchor `id`.
    pub fn source_path_for(id: &str) -> String {
        format!("docs/anchors/{id}.adoc")
    }
}

impl DatasetSnapshot {
    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}
