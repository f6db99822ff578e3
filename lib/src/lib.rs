//! A toolkit for building the Semantic Anchors catalog.
//!
//! # Overview
//!
//! The catalog is a directory of AsciiDoc documents, one per _anchor_: a
//! well-defined term, methodology or framework. Each document declares its
//! metadata as attribute entries (`:roles: ...`, `:categories: ...`) and
//! describes the anchor in its body. This crate turns that directory into
//! everything the website and its automated readers consume:
//!
//! ```text
//!            docs/anchors/*.adoc
//!                    |
//!        +-----------+-------------+------------------+
//!        |                         |                  |
//!   [catalog]                 [asciidoc]          [search]
//!   extract + validate        adoc -> markdown    fetch + strip
//!        |                         |                  |
//!   [catalog::Dataset]     +-------+------+      SearchIndex
//!   anchors.json, ...      |              |       (query)
//!        |            [reference]    [markdown]
//!   [sitemap]         llms.txt       html pages
//! ```
//!
//! The pieces are:
//!
//!   * [`catalog`]: parses attribute entries into [`catalog::CatalogEntry`]
//!     records, validates required fields and aggregates category and role
//!     groupings into a serializable [`catalog::Dataset`].
//!
//!   * [`asciidoc`]: an ordered [`asciidoc::Pipeline`] of named, pure text
//!     [`asciidoc::Rule`]s converting the subset of AsciiDoc used by the
//!     corpus into Markdown (or into plain searchable text).
//!
//!   * [`markdown`]: renders converted Markdown as HTML via `pulldown-cmark`
//!     event plugins: heading ids, anchors, highlighting, table of contents.
//!
//!   * [`reference`] and [`sitemap`]: the consolidated documents and the
//!     sitemap assembled from the dataset.
//!
//!   * [`source`], [`loader`], [`search`] and [`state`]: the reading side.
//!     Content is fetched through a [`source::ContentSource`], the dataset is
//!     loaded once and cached, and a [`search::SearchIndex`] is built in
//!     bounded batches and queried with weighted, conjunctive term matching.

#[macro_use]
pub mod error;
pub mod util;
pub mod format;
pub mod config;
pub mod catalog;
pub mod asciidoc;
pub mod markdown;
pub mod reference;
pub mod sitemap;
pub mod source;
pub mod loader;
pub mod search;
pub mod state;

pub use config::Settings;
pub use catalog::{CatalogEntry, CategoryGroup, RoleGroup, Dataset, DatasetSnapshot};
pub use asciidoc::{Conversion, LinkTargets, Pipeline, Rule};
pub use search::{IndexState, SearchIndex};
pub use state::AppState;
