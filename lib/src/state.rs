use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;
use crate::loader::DataLoader;
use crate::search::SearchIndex;
use crate::source::{fetch_entry_content, ContentSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    En,
    De,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::En, Language::De];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL.iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| error!("unsupported language", "language" => s, "expected en or de"))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Preferences {
    language: Language,
    theme: Theme,
}

/// The state of one reading session: the preferences, the dataset and the
/// search index. Everything is built over a single [`ContentSource`].
pub struct AppState {
    source: Arc<dyn ContentSource>,
    data_prefix: String,
    preferences: RwLock<Preferences>,
    loader: DataLoader,
    index: RwLock<Arc<SearchIndex>>,
}

impl AppState {
    /// A fresh session over `source`, with the data files under
    /// `data_prefix`.
    pub fn new(source: Arc<dyn ContentSource>, data_prefix: &str) -> Self {
        AppState {
            loader: DataLoader::new(source.clone(), data_prefix),
            index: RwLock::new(Arc::new(SearchIndex::new(source.clone()))),
            preferences: RwLock::default(),
            data_prefix: data_prefix.to_string(),
            source,
        }
    }

    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.preferences.read().language
    }

    /// Switches the language. The search index covers the documents of one
    /// language, so a change starts over with an unbuilt index.
    pub fn set_language(&self, language: Language) {
        let previous = std::mem::replace(&mut self.preferences.write().language, language);
        if previous != language {
            *self.index.write() = self.fresh_index(language);
        }
    }

    fn fresh_index(&self, language: Language) -> Arc<SearchIndex> {
        Arc::new(SearchIndex::new(self.source.clone()).with_language(language.code()))
    }

    pub fn theme(&self) -> Theme {
        self.preferences.read().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        self.preferences.write().theme = theme;
    }

    /// Switches between the light and dark theme, returning the new one.
    pub fn toggle_theme(&self) -> Theme {
        let mut preferences = self.preferences.write();
        preferences.theme = preferences.theme.toggle();
        preferences.theme
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    pub fn search_index(&self) -> Arc<SearchIndex> {
        self.index.read().clone()
    }

    /// The source document of anchor `id` in the current language.
    pub async fn entry_content(&self, id: &str) -> crate::error::Result<String> {
        fetch_entry_content(&*self.source, id, self.language().code()).await
    }

    /// Restores the state of a fresh session: default preferences, no
    /// cached dataset and an index that hasn't been built.
    pub async fn reset(&self) {
        *self.preferences.write() = Preferences::default();
        self.loader.reset().await;
        *self.index.write() = self.fresh_index(Language::default());
        tracing::debug!(data = %self.data_prefix, "session state reset");
    }
}
