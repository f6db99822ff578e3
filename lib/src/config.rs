use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::asciidoc::{Conversion, LinkTargets};
use crate::error::Result;
use crate::format::{Format, Toml};

pub const CONFIG_FILE: &str = "anchorage.toml";

/// Project settings, read from `anchorage.toml`. Every field is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// The published website, without a trailing slash.
    pub site_url: String,
    /// The source repository, without a trailing slash.
    pub repository: String,
    pub branch: String,
    pub anchors_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub public_dir: PathBuf,
    pub data_dir: PathBuf,
    pub category_names: FxHashMap<String, String>,
    pub role_names: FxHashMap<String, String>,
    pub pages: Vec<Page>,
}

/// A document pre-rendered to HTML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let page = |source: &str, output: &str| Page {
            source: source.into(),
            output: output.into(),
        };

        Settings {
            site_url: "https://llm-coding.github.io/Semantic-Anchors".into(),
            repository: "https://github.com/LLM-Coding/Semantic-Anchors".into(),
            branch: "main".into(),
            anchors_dir: "docs/anchors".into(),
            docs_dir: "docs".into(),
            public_dir: "website/public".into(),
            data_dir: "website/public/data".into(),
            category_names: FxHashMap::default(),
            role_names: FxHashMap::default(),
            pages: vec![
                page("docs/about.adoc", "website/public/docs/about.html"),
                page("docs/about.de.adoc", "website/public/docs/about.de.html"),
                page("CONTRIBUTING.adoc", "website/public/CONTRIBUTING.html"),
                page("CONTRIBUTING.de.adoc", "website/public/CONTRIBUTING.de.html"),
                page("docs/all-anchors.adoc", "website/public/docs/all-anchors.html"),
            ],
        }
    }
}

impl Settings {
    /// Reads settings from `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut settings: Settings = Toml::read(path)?;
        settings.site_url.truncate(settings.site_url.trim_end_matches('/').len());
        settings.repository.truncate(settings.repository.trim_end_matches('/').len());
        Ok(settings)
    }

    /// Reads `anchorage.toml` from `root` if it exists, else the defaults.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        match path.is_file() {
            true => Settings::read(path),
            false => Ok(Settings::default()),
        }
    }

    pub fn link_targets(&self) -> LinkTargets {
        LinkTargets {
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            site: self.site_url.clone(),
        }
    }

    /// The conversion used for standalone documents.
    pub fn conversion(&self) -> Conversion {
        Conversion { links: self.link_targets(), heading_offset: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings.anchors_dir, Path::new("docs/anchors"));
        assert_eq!(settings.pages.len(), 5);
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"
            site_url = "https://example.com/anchors/"
            branch = "trunk"

            [category_names]
            testing-quality = "Testing"
        "#).unwrap();

        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings.site_url, "https://example.com/anchors");
        assert_eq!(settings.branch, "trunk");
        assert_eq!(settings.repository, "https://github.com/LLM-Coding/Semantic-Anchors");
        assert_eq!(settings.category_names["testing-quality"], "Testing");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "site_url = [").unwrap();
        assert!(Settings::discover(dir.path()).is_err());
    }
}
