use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, CategoryGroup, DatasetSnapshot, RoleGroup};
use crate::config::Settings;
use crate::error::Result;
use crate::format::Json;
use crate::util::title_case;

pub const ANCHORS_FILE: &str = "anchors.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const ROLES_FILE: &str = "roles.json";
pub const METADATA_FILE: &str = "metadata.json";

const CATEGORY_NAMES: &[(&str, &str)] = &[
    ("testing-quality", "Testing & Quality Practices"),
    ("architecture-design", "Architecture & Design"),
    ("design-principles", "Design Principles & Patterns"),
    ("requirements-engineering", "Requirements Engineering"),
    ("documentation", "Documentation"),
    ("communication-presentation", "Communication & Presentation"),
    ("decision-making-strategy", "Decision Making & Strategy"),
    ("development-practices", "Development Practices"),
    ("statistical-methods", "Statistical Methods & Process Monitoring"),
    ("interaction-reasoning", "Interaction & Reasoning Patterns"),
    ("uncategorized", "Uncategorized"),
];

const ROLE_NAMES: &[(&str, &str)] = &[
    ("software-developer", "Software Developer / Engineer"),
    ("software-architect", "Software Architect"),
    ("qa-engineer", "QA Engineer / Tester"),
    ("devops-engineer", "DevOps Engineer"),
    ("product-owner", "Product Owner / Product Manager"),
    ("business-analyst", "Business Analyst / Requirements Engineer"),
    ("technical-writer", "Technical Writer / Documentation Specialist"),
    ("ux-designer", "UX Designer / Researcher"),
    ("data-scientist", "Data Scientist / Statistician"),
    ("consultant", "Consultant / Coach"),
    ("team-lead", "Team Lead / Engineering Manager"),
    ("educator", "Educator / Trainer"),
];

/// Display names for category and role ids: overrides first, then the
/// built-in tables, then the title-cased id.
#[derive(Debug, Clone, Default)]
pub struct Names {
    pub categories: FxHashMap<String, String>,
    pub roles: FxHashMap<String, String>,
}

impl Names {
    pub fn from_settings(settings: &Settings) -> Self {
        Names {
            categories: settings.category_names.clone(),
            roles: settings.role_names.clone(),
        }
    }

    pub fn category(&self, id: &str) -> String {
        lookup(&self.categories, CATEGORY_NAMES, id)
    }

    pub fn role(&self, id: &str) -> String {
        lookup(&self.roles, ROLE_NAMES, id)
    }
}

fn lookup(overrides: &FxHashMap<String, String>, table: &[(&str, &str)], id: &str) -> String {
    if let Some(name) = overrides.get(id) {
        return name.clone();
    }

    table.iter()
        .find(|(key, _)| *key == id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| title_case(id))
}

/// The built-in display name of category `id`.
pub fn category_name(id: &str) -> String {
    Names::default().category(id)
}

/// The built-in display name of role `id`.
pub fn role_name(id: &str) -> String {
    Names::default().role(id)
}

/// Groups `entries` by the ids `key` returns. Groups are sorted by id;
/// members keep the order in which they were first seen.
fn group_by<'a, F>(entries: &'a [CatalogEntry], key: F) -> Vec<(String, Vec<String>)>
    where F: Fn(&'a CatalogEntry) -> &'a [String]
{
    let mut groups: Vec<(String, Vec<String>)> = vec![];
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    for entry in entries {
        for id in key(entry) {
            let i = *index.entry(id.as_str()).or_insert_with(|| {
                groups.push((id.clone(), vec![]));
                groups.len() - 1
            });

            groups[i].1.push(entry.id.clone());
        }
    }

    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
}

pub fn group_by_category(entries: &[CatalogEntry], names: &Names) -> Vec<CategoryGroup> {
    group_by(entries, |e| e.categories.as_slice())
        .into_iter()
        .map(|(id, members)| CategoryGroup {
            display_name: names.category(&id),
            id,
            member_entry_ids: members,
        })
        .collect()
}

pub fn group_by_role(entries: &[CatalogEntry], names: &Names) -> Vec<RoleGroup> {
    group_by(entries, |e| e.roles.as_slice())
        .into_iter()
        .map(|(id, members)| RoleGroup {
            display_name: names.role(&id),
            id,
            member_entry_ids: members,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub generated_at: String,
    pub version: String,
    pub counts: Counts,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub anchors: usize,
    pub categories: usize,
    pub roles: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub average_roles_per_anchor: String,
    pub average_categories_per_anchor: String,
    pub anchors_with_tags: usize,
    pub anchors_with_related: usize,
}

impl Summary {
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(entries: &[CatalogEntry], categories: usize, roles: usize) -> Self {
        let average = |count: fn(&CatalogEntry) -> usize| -> String {
            match entries.len() {
                0 => "0.00".into(),
                n => {
                    let total: usize = entries.iter().map(count).sum();
                    format!("{:.2}", total as f64 / n as f64)
                }
            }
        };

        Summary {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: Self::VERSION.into(),
            counts: Counts { anchors: entries.len(), categories, roles },
            statistics: Statistics {
                average_roles_per_anchor: average(|e| e.roles.len()),
                average_categories_per_anchor: average(|e| e.categories.len()),
                anchors_with_tags: entries.iter().filter(|e| !e.tags.is_empty()).count(),
                anchors_with_related: entries.iter().filter(|e| !e.related.is_empty()).count(),
            },
        }
    }
}

/// The complete generated dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub entries: Vec<CatalogEntry>,
    pub categories: Vec<CategoryGroup>,
    pub roles: Vec<RoleGroup>,
    pub summary: Summary,
}

impl Dataset {
    pub fn build(entries: Vec<CatalogEntry>, names: &Names) -> Self {
        let categories = group_by_category(&entries, names);
        let roles = group_by_role(&entries, names);
        let summary = Summary::new(&entries, categories.len(), roles.len());
        Dataset { entries, categories, roles, summary }
    }

    /// Writes the four dataset files into `dir`, creating it if needed.
    pub fn write(&self, dir: &Path) -> Result<()> {
        Json::write(dir.join(ANCHORS_FILE), &self.entries)?;
        Json::write(dir.join(CATEGORIES_FILE), &self.categories)?;
        Json::write(dir.join(ROLES_FILE), &self.roles)?;
        Json::write(dir.join(METADATA_FILE), &self.summary)?;

        tracing::info!(
            dir = %dir.display(),
            anchors = self.summary.counts.anchors,
            categories = self.summary.counts.categories,
            roles = self.summary.counts.roles,
            "wrote dataset"
        );

        Ok(())
    }

    pub fn snapshot(&self) -> DatasetSnapshot {
        DatasetSnapshot {
            entries: self.entries.clone(),
            categories: self.categories.clone(),
            roles: self.roles.clone(),
        }
    }
}
