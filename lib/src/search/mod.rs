//! Full-text search over the anchor documents.
//!
//! The dataset only carries each anchor's metadata; the bodies live in the
//! per-anchor documents. A [`SearchIndex`] fetches those documents through a
//! [`ContentSource`] in bounded batches, reduces them to plain lower-cased
//! text and then answers weighted, conjunctive term queries.
//!
//! The index moves through [`IndexState::NotBuilt`], [`IndexState::Building`]
//! and [`IndexState::Ready`]; it is never rebuilt. Queries only see the index
//! once it is `Ready`. Until then [`SearchIndex::search_or_filter()`] falls
//! back to substring matching over the lightweight fields of the dataset.

mod batch;
pub mod filter;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::OnceCell;

use crate::asciidoc::Pipeline;
use crate::catalog::CatalogEntry;
use crate::source::{fetch_entry_content, ContentSource};
use self::filter::terms;

pub use batch::run_in_batches;
pub use filter::{apply_filters, filter_by_roles, filter_by_text, Filters};

/// Number of documents fetched at once.
pub const BATCH_SIZE: usize = 8;

const TITLE_WEIGHT: u32 = 10;
const PROPONENT_WEIGHT: u32 = 5;
const TAG_WEIGHT: u32 = 3;
const CONTENT_WEIGHT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexState {
    NotBuilt,
    Building,
    Ready,
}

/// One indexed anchor. Every field is lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndexEntry {
    pub id: String,
    pub title: String,
    pub proponents: Vec<String>,
    pub tags: Vec<String>,
    pub roles: Vec<String>,
    pub categories: Vec<String>,
    /// The plain text of the document body.
    pub content: String,
}

impl SearchIndexEntry {
    fn new(entry: &CatalogEntry, content: String) -> Self {
        let lower = |values: &[String]| values.iter().map(|v| v.to_lowercase()).collect();
        SearchIndexEntry {
            id: entry.id.clone(),
            title: entry.title.to_lowercase(),
            proponents: lower(&entry.proponents),
            tags: lower(&entry.tags),
            roles: entry.roles.clone(),
            categories: entry.categories.clone(),
            content,
        }
    }

    /// The weight `term` earns in this entry; 0 if it matches nowhere.
    fn score(&self, term: &str) -> u32 {
        let mut score = 0;
        if self.title.contains(term) {
            score += TITLE_WEIGHT;
        }

        if self.proponents.iter().any(|p| p.contains(term)) {
            score += PROPONENT_WEIGHT;
        }

        if self.tags.iter().any(|t| t.contains(term)) {
            score += TAG_WEIGHT;
        }

        if self.content.contains(term) {
            score += CONTENT_WEIGHT;
        }

        score
    }
}

pub struct SearchIndex {
    source: Arc<dyn ContentSource>,
    language: String,
    state: RwLock<IndexState>,
    entries: RwLock<Vec<SearchIndexEntry>>,
    built: OnceCell<()>,
}

impl SearchIndex {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        SearchIndex {
            source,
            language: "en".into(),
            state: RwLock::new(IndexState::NotBuilt),
            entries: RwLock::new(Vec::new()),
            built: OnceCell::new(),
        }
    }

    /// Indexes the documents of `language` where they exist.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn state(&self) -> IndexState {
        *self.state.read()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == IndexState::Ready
    }

    /// Number of indexed anchors.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The indexed form of anchor `id`, if it was indexed.
    pub fn indexed(&self, id: &str) -> Option<SearchIndexEntry> {
        self.entries.read().iter().find(|e| e.id == id).cloned()
    }

    /// Builds the index over `entries`. Concurrent callers share a single
    /// build, and once the index is ready further calls return immediately.
    pub async fn build(&self, entries: &[CatalogEntry]) {
        self.built.get_or_init(|| self.index(entries)).await;
    }

    async fn index(&self, entries: &[CatalogEntry]) {
        *self.state.write() = IndexState::Building;
        tracing::info!(entries = entries.len(), "building search index");

        // Entries are only published once every batch settled, so a build
        // that is dropped midway leaves nothing behind for the next one.
        let plain = Pipeline::plain_text();
        let (source, language) = (&*self.source, self.language.as_str());
        let mut indexed = Vec::with_capacity(entries.len());
        run_in_batches(entries, BATCH_SIZE, |entry| async move {
            fetch_entry_content(source, &entry.id, language).await
        }, |entry, result| match result {
            Ok(text) => indexed.push(SearchIndexEntry::new(entry, plain.run(&text))),
            Err(e) => tracing::warn!(id = %entry.id, "failed to index anchor: {}", e.message()),
        }).await;

        *self.entries.write() = indexed;
        *self.state.write() = IndexState::Ready;
        tracing::info!(indexed = self.len(), "search index built");
    }

    /// The ids of the anchors matching every term of `query`, best first.
    /// Empty unless the index is ready.
    pub fn search(&self, query: &str) -> Vec<String> {
        if !self.is_ready() {
            tracing::debug!("search index not ready");
            return vec![];
        }

        let terms = terms(query);
        if terms.is_empty() {
            return vec![];
        }

        let entries = self.entries.read();
        let mut matches: Vec<(&str, u32)> = entries.iter()
            .filter_map(|entry| {
                terms.iter().try_fold(0, |total, term| match entry.score(term) {
                    0 => None,
                    score => Some(total + score),
                }).map(|score| (entry.id.as_str(), score))
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1));
        matches.into_iter().map(|(id, _)| id.to_string()).collect()
    }

    /// [`search()`](Self::search) once the index is ready. Before that, the
    /// anchors in `entries` whose title, tags or id contain every term.
    pub fn search_or_filter(&self, query: &str, entries: &[CatalogEntry]) -> Vec<String> {
        if self.is_ready() {
            return self.search(query);
        }

        let terms = terms(query);
        if terms.is_empty() {
            return vec![];
        }

        let contains = |field: &str, term: &str| field.to_lowercase().contains(term);
        entries.iter()
            .filter(|entry| terms.iter().all(|term| {
                contains(&entry.title, term)
                    || entry.tags.iter().any(|t| contains(t, term))
                    || contains(&entry.id, term)
            }))
            .map(|entry| entry.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::MemorySource;

    fn entry(id: &str, title: &str, tags: &[&str], proponents: &[&str]) -> CatalogEntry {
        CatalogEntry {
            id: id.into(),
            title: title.into(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            proponents: proponents.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn finds_by_title_proponent_and_content() {
        let source = Arc::new(MemorySource::with(&[
            ("docs/anchors/x.adoc", "A practical testing method for teams."),
        ]));

        let index = SearchIndex::new(source);
        assert_eq!(index.state(), IndexState::NotBuilt);
        index.build(&[entry("x", "TDD London", &["testing"], &["Steve Freeman"])]).await;
        assert_eq!(index.state(), IndexState::Ready);

        assert_eq!(index.search("london"), ["x"]);
        assert_eq!(index.search("freeman"), ["x"]);
        assert_eq!(index.search("PRACTICAL teams"), ["x"]);
        assert!(index.search("nonexistent").is_empty());
        assert!(index.search("   ").is_empty());
        assert_eq!(index.indexed("x").unwrap().content, "a practical testing method for teams.");
    }

    #[tokio::test]
    async fn terms_are_conjunctive_and_weighted() {
        let source = Arc::new(MemorySource::with(&[
            ("docs/anchors/a.adoc", "mentions testing once"),
            ("docs/anchors/b.adoc", "nothing relevant"),
            ("docs/anchors/c.adoc", "about design"),
            ("docs/anchors/d.adoc", "more testing"),
        ]));

        let entries = [
            entry("a", "Mutation", &[], &[]),
            entry("b", "Testing Pyramid", &["testing"], &[]),
            entry("c", "Design Testing", &[], &[]),
            entry("d", "Other", &[], &[]),
        ];

        let index = SearchIndex::new(source);
        index.build(&entries).await;

        // b: 10 + 3, c: 10, a: 1, d: 1 (ties keep index order)
        assert_eq!(index.search("testing"), ["b", "c", "a", "d"]);
        assert_eq!(index.search("testing design"), ["c"]);
    }

    #[tokio::test]
    async fn not_built_returns_nothing() {
        let index = SearchIndex::new(Arc::new(MemorySource::default()));
        assert!(index.search("anything").is_empty());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn concurrent_builds_fetch_once() {
        let documents: Vec<(String, String)> = (0..20)
            .map(|i| (format!("docs/anchors/a{i}.adoc"), format!("body {i}")))
            .collect();

        let pairs: Vec<(&str, &str)> = documents.iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let source = Arc::new(MemorySource::with(&pairs));
        let entries: Vec<_> = (0..20).map(|i| entry(&format!("a{i}"), "t", &[], &[])).collect();

        let index = SearchIndex::new(source.clone());
        tokio::join!(index.build(&entries), index.build(&entries), index.build(&entries));
        assert_eq!(source.fetches(), 20);
        assert_eq!(index.len(), 20);

        index.build(&entries).await;
        assert_eq!(source.fetches(), 20);
    }

    #[tokio::test]
    async fn dropped_build_leaves_no_duplicates() {
        let documents: Vec<(String, String)> = (0..20)
            .map(|i| (format!("docs/anchors/a{i}.adoc"), format!("body {i}")))
            .collect();

        let pairs: Vec<(&str, &str)> = documents.iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let source = Arc::new(MemorySource::with(&pairs));
        let entries: Vec<_> = (0..20).map(|i| entry(&format!("a{i}"), "t", &[], &[])).collect();
        let index = SearchIndex::new(source.clone());

        {
            let build = index.build(&entries);
            tokio::pin!(build);
            assert!(futures::poll!(&mut build).is_pending());
            assert_eq!(index.state(), IndexState::Building);
        }

        assert!(source.fetches() > 0);
        assert!(index.is_empty());

        index.build(&entries).await;
        assert!(index.is_ready());
        assert_eq!(index.len(), 20);
        assert_eq!(index.search("body 17"), ["a17"]);

        let mut ids: Vec<_> = index.entries.read().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    /// A source whose fetches wait until the test opens the gate.
    struct GatedSource {
        inner: MemorySource,
        gate: tokio::sync::Semaphore,
    }

    #[async_trait::async_trait]
    impl ContentSource for GatedSource {
        async fn fetch(&self, path: &str) -> crate::error::Result<String> {
            let _permit = self.gate.acquire().await;
            self.inner.fetch(path).await
        }
    }

    #[tokio::test]
    async fn queries_while_building() {
        let source = Arc::new(GatedSource {
            inner: MemorySource::with(&[
                ("docs/anchors/tdd.adoc", "outside-in"),
                ("docs/anchors/bdd.adoc", "given when then"),
                ("docs/anchors/ddd.adoc", "ubiquitous language"),
            ]),
            gate: tokio::sync::Semaphore::new(0),
        });

        let entries = [
            entry("tdd", "Test-Driven Development", &["testing"], &["Kent Beck"]),
            entry("bdd", "Behavior-Driven Development", &["testing"], &[]),
            entry("ddd", "Domain-Driven Design", &["design"], &[]),
        ];

        let index = SearchIndex::new(source.clone());
        let first = index.build(&entries);
        let second = index.build(&entries);
        tokio::pin!(first, second);

        assert!(futures::poll!(&mut first).is_pending());
        assert!(futures::poll!(&mut second).is_pending());
        assert_eq!(index.state(), IndexState::Building);

        // no full-text results yet, only the lightweight fields
        assert!(index.search("development").is_empty());
        assert_eq!(index.search_or_filter("driven testing", &entries), ["tdd", "bdd"]);
        assert_eq!(index.search_or_filter("ddd", &entries), ["ddd"]);
        assert!(index.search_or_filter("ubiquitous", &entries).is_empty());
        assert!(index.search_or_filter("beck", &entries).is_empty());

        source.gate.add_permits(1);
        tokio::join!(first, second);
        assert!(index.is_ready());
        assert_eq!(source.inner.fetches(), 3);
        assert_eq!(index.search_or_filter("ubiquitous", &entries), ["ddd"]);
    }

    #[tokio::test]
    async fn failed_fetches_are_skipped() {
        let source = Arc::new(MemorySource::with(&[("docs/anchors/ok.adoc", "fine")]));
        let index = SearchIndex::new(source);
        index.build(&[entry("ok", "Ok", &[], &[]), entry("gone", "Gone", &[], &[])]).await;

        assert!(index.is_ready());
        assert_eq!(index.len(), 1);
        assert!(index.indexed("gone").is_none());
        assert!(index.search("gone").is_empty());
    }

    #[tokio::test]
    async fn degraded_search_before_ready() {
        let index = SearchIndex::new(Arc::new(MemorySource::default()));
        let entries = [
            entry("tdd", "Test-Driven Development", &["testing"], &["Kent Beck"]),
            entry("bdd", "Behavior-Driven Development", &[], &[]),
        ];

        assert_eq!(index.search_or_filter("driven test", &entries), ["tdd"]);
        assert_eq!(index.search_or_filter("bdd", &entries), ["bdd"]);
        assert!(index.search_or_filter("beck", &entries).is_empty());
    }
}
