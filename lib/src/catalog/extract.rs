use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::catalog::{decode_html_entities, CatalogEntry};
use crate::error::{Detail, Error, Result};

static ATTRIBUTE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:(!?)([A-Za-z0-9_][A-Za-z0-9_-]*)(!?):(?:[ \t]+(.*))?$").unwrap()
});

/// The title and attribute entries of a document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attributes {
    pub title: Option<String>,
    values: FxHashMap<String, String>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The comma-separated list value of attribute `name`.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name).map(parse_list).unwrap_or_default()
    }
}

/// Splits a comma-separated attribute value, trimming items and dropping
/// empty ones.
pub fn parse_list(value: &str) -> Vec<String> {
    value.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Reads the document title and every attribute entry of `text`. Later
/// entries override earlier ones; `:name!:` and `:!name:` unset. Entries
/// inside listing and literal blocks are ignored, as is a leading `---`
/// front matter block.
pub fn parse_attributes(text: &str) -> Attributes {
    let mut attributes = Attributes::default();
    let mut lines = skip_front_matter(text).lines();
    let mut in_block = false;

    while let Some(line) = lines.next() {
        let line = line.trim_end();
        if line == "----" || line == "...." {
            in_block = !in_block;
            continue;
        }

        if in_block || line.starts_with("//") {
            continue;
        }

        if attributes.title.is_none() {
            if let Some(title) = line.strip_prefix("= ") {
                let title = decode_html_entities(title.trim());
                attributes.title = Some(title.into_owned());
                continue;
            }
        }

        let Some(caps) = ATTRIBUTE_ENTRY.captures(line) else {
            continue;
        };

        let name = caps[2].to_string();
        if !caps[1].is_empty() || !caps[3].is_empty() {
            attributes.values.remove(&name);
            continue;
        }

        // A trailing ` \` soft-wraps the value onto the next line.
        let mut value = caps.get(4).map_or("", |m| m.as_str()).trim().to_string();
        while let Some(head) = value.strip_suffix(" \\") {
            value = head.trim_end().to_string();
            match lines.next() {
                Some(next) => {
                    value.push(' ');
                    value.push_str(next.trim());
                }
                None => break,
            }
        }

        attributes.values.insert(name, value);
    }

    attributes
}

fn skip_front_matter(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("---\n") else {
        return text;
    };

    match rest.find("\n---\n") {
        Some(end) => &rest[end + 5..],
        None => text,
    }
}

/// A required attribute is missing: the document is excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingTitle,
    MissingRoles,
    Unreadable(String),
}

/// An expected attribute is missing: the document is still included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    MissingCategories,
    MissingProponents,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingTitle => f.write_str("Missing or invalid title"),
            Issue::MissingRoles => f.write_str("Missing :roles: attribute"),
            Issue::Unreadable(reason) => write!(f, "Unreadable file: {reason}"),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingCategories => f.write_str("Missing :categories: attribute"),
            Warning::MissingProponents => f.write_str("Missing :proponents: attribute"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid {
        entry: CatalogEntry,
        warnings: Vec<Warning>,
    },
    Invalid {
        id: String,
        issues: Vec<Issue>,
        warnings: Vec<Warning>,
    },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid { .. })
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Validation::Valid { warnings, .. } | Validation::Invalid { warnings, .. } => warnings,
        }
    }
}

/// Builds and validates the catalog entry for document `id` with contents
/// `text`.
pub fn validate(id: &str, text: &str) -> Validation {
    let attributes = parse_attributes(text);
    let entry = CatalogEntry {
        id: id.to_string(),
        title: attributes.title.clone().unwrap_or_else(|| id.to_string()),
        categories: attributes.list("categories"),
        roles: attributes.list("roles"),
        related: attributes.list("related"),
        proponents: attributes.list("proponents"),
        tags: attributes.list("tags"),
        source_path: CatalogEntry::source_path_for(id),
    };

    let mut issues = vec![];
    let mut warnings = vec![];
    if entry.title.is_empty() || entry.title == id {
        issues.push(Issue::MissingTitle);
    }

    if entry.categories.is_empty() {
        warnings.push(Warning::MissingCategories);
    }

    if entry.roles.is_empty() {
        issues.push(Issue::MissingRoles);
    }

    if entry.proponents.is_empty() {
        warnings.push(Warning::MissingProponents);
    }

    match issues.is_empty() {
        true => Validation::Valid { entry, warnings },
        false => Validation::Invalid { id: id.to_string(), issues, warnings },
    }
}

/// Returns `true` if `file_name` is a canonical anchor document: an `.adoc`
/// file that is neither the template nor a localized `name.xx.adoc` variant.
pub fn is_anchor_file(file_name: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(".adoc") else {
        return false;
    };

    let localized = stem.rsplit_once('.')
        .map_or(false, |(_, lang)| {
            lang.len() == 2 && lang.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        });

    file_name != "_template.adoc" && !stem.is_empty() && !localized
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileIssues {
    pub file: String,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileWarnings {
    pub file: String,
    pub warnings: Vec<Warning>,
}

/// The outcome of extracting a whole anchors directory.
#[derive(Debug, Default, Clone)]
pub struct Extraction {
    /// Valid entries, in file name order.
    pub entries: Vec<CatalogEntry>,
    pub errors: Vec<FileIssues>,
    pub warnings: Vec<FileWarnings>,
}

/// Lists the anchor documents directly inside `dir`, sorted by file name.
pub fn anchor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return err! {
            "anchors directory does not exist",
            "path" => dir.display(),
        };
    }

    let mut files = vec![];
    for entry in jwalk::WalkDir::new(dir).max_depth(1).sort(true) {
        let entry = entry?;
        if entry.depth == 0 || !entry.file_type().is_file() {
            continue;
        }

        if is_anchor_file(&entry.file_name().to_string_lossy()) {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Extracts and validates every anchor document in `dir`.
pub fn extract_catalog(dir: &Path) -> Result<Extraction> {
    let files = anchor_files(dir)?;
    tracing::info!(count = files.len(), dir = %dir.display(), "found anchor files");

    let outcomes: Vec<(String, Validation)> = files.par_iter()
        .map(|path| {
            let file = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
            let id = file.strip_suffix(".adoc").unwrap_or(&file).to_string();
            let validation = match fs::read_to_string(path) {
                Ok(text) => validate(&id, &text),
                Err(e) => Validation::Invalid {
                    id,
                    issues: vec![Issue::Unreadable(e.to_string())],
                    warnings: vec![],
                },
            };

            (file, validation)
        })
        .collect();

    let mut extraction = Extraction::default();
    for (file, validation) in outcomes {
        if !validation.warnings().is_empty() {
            let warnings = validation.warnings().to_vec();
            tracing::warn!(file = %file, "{}", join(&warnings));
            extraction.warnings.push(FileWarnings { file: file.clone(), warnings });
        }

        match validation {
            Validation::Valid { entry, .. } => {
                tracing::debug!(file = %file, "extracted");
                extraction.entries.push(entry);
            }
            Validation::Invalid { issues, .. } => {
                tracing::error!(file = %file, "{}", join(&issues));
                extraction.errors.push(FileIssues { file, issues });
            }
        }
    }

    Ok(extraction)
}

impl Extraction {
    /// All-or-nothing: the entries if every file is valid, otherwise an error
    /// naming each failing file and its issues.
    pub fn into_entries(self) -> Result<Vec<CatalogEntry>> {
        if self.errors.is_empty() {
            return Ok(self.entries);
        }

        let parameters = self.errors.iter()
            .map(|e| (Some(e.file.clone()), join(&e.issues)))
            .collect();

        Err(Error::from(Detail {
            message: format!("found {} files with errors; fix them before continuing",
                self.errors.len()),
            parameters,
        }))
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}
