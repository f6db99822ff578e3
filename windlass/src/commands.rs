use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use anchorage::catalog::{self, CatalogEntry, CategoryGroup, Dataset, Names};
use anchorage::catalog::{ANCHORS_FILE, CATEGORIES_FILE};
use anchorage::error::{Chainable, Result};
use anchorage::format::{write_file, Format, Json};
use anchorage::markdown::{render_page, SyntaxHighlight};
use anchorage::reference::{all_anchors_adoc, llms_txt, LlmsInput};
use anchorage::source::{ContentSource, DirSource};
use anchorage::state::{AppState, Language};
use anchorage::{asciidoc, error, sitemap};

use crate::project::Project;

pub const ALL_ANCHORS_FILE: &str = "all-anchors.adoc";
pub const ABOUT_FILE: &str = "about.adoc";
pub const LLMS_FILE: &str = "llms.txt";
pub const SITEMAP_FILE: &str = "sitemap.xml";

pub fn extract(project: &Project) -> Result<Dataset> {
    let extraction = catalog::extract_catalog(&project.anchors_dir())?;
    let (valid, warned) = (extraction.entries.len(), extraction.warnings.len());
    let entries = extraction.into_entries()?;

    let dataset = Dataset::build(entries, &Names::from_settings(&project.settings));
    dataset.write(&project.data_dir())?;
    tracing::info!(anchors = valid, warnings = warned, "extraction complete");
    Ok(dataset)
}

fn anchor_path(project: &Project, id: &str) -> std::path::PathBuf {
    project.anchors_dir().join(format!("{id}.adoc"))
}

pub fn reference(project: &Project) -> Result<()> {
    let categories: Vec<CategoryGroup> = Json::read(project.data_dir().join(CATEGORIES_FILE))
        .chain(error!("run `windlass extract` first"))?;

    let adoc = all_anchors_adoc(&categories, |id| anchor_path(project, id).is_file());
    let adoc_path = project.docs_dir().join(ALL_ANCHORS_FILE);
    write_file(&adoc_path, adoc)?;
    tracing::info!(path = %adoc_path.display(), categories = categories.len(), "generated");

    let about_path = project.docs_dir().join(ABOUT_FILE);
    let about = fs::read_to_string(&about_path).chain_with(|| error! {
        "failed to read introduction",
        "path" => about_path.display(),
    })?;

    let mut sources = FxHashMap::default();
    for id in categories.iter().flat_map(|c| &c.member_entry_ids) {
        if let Ok(source) = fs::read_to_string(anchor_path(project, id)) {
            sources.insert(id.clone(), source);
        }
    }

    let conversion = project.settings.conversion();
    let text = llms_txt(&LlmsInput {
        categories: &categories,
        about: &about,
        sources: &sources,
        conversion: &conversion,
    });

    let llms_path = project.public_dir().join(LLMS_FILE);
    write_file(&llms_path, &text)?;
    tracing::info!(path = %llms_path.display(), kb = text.len() / 1024, "generated");
    Ok(())
}

pub fn render(project: &Project) -> Result<()> {
    SyntaxHighlight::warm_up();
    let conversion = project.settings.conversion();
    for page in &project.settings.pages {
        let source = project.path(&page.source);
        if !source.is_file() {
            tracing::debug!(path = %source.display(), "page source missing; skipping");
            continue;
        }

        let output = project.path(&page.output);
        let rendered = render_page(&source, &conversion)?;
        write_file(&output, rendered.html)?;
        tracing::info!(path = %output.display(), "rendered");
    }

    Ok(())
}

pub fn sitemap(project: &Project) -> Result<()> {
    let entries: Vec<CatalogEntry> = Json::read(project.data_dir().join(ANCHORS_FILE))
        .chain(error!("run `windlass extract` first"))?;

    let today = chrono::Utc::now().date_naive();
    let xml = sitemap::sitemap_xml(&project.settings.site_url, &entries, today);
    let path = project.public_dir().join(SITEMAP_FILE);
    write_file(&path, xml)?;
    tracing::info!(path = %path.display(), urls = sitemap::url_count(&entries), "generated");
    Ok(())
}

pub fn build(project: &Project) -> Result<()> {
    extract(project)?;
    reference(project)?;
    render(project)?;
    sitemap(project)
}

pub fn convert(project: &Project, file: &Path, offset: Option<i8>) -> Result<String> {
    let file = project.path(file);
    let text = fs::read_to_string(&file).chain_with(|| error! {
        "failed to read document",
        "path" => file.display(),
    })?;

    let conversion = project.settings.conversion()
        .with_heading_offset(offset.unwrap_or(0));

    let base = file.parent().unwrap_or(&project.root);
    let resolved = asciidoc::resolve_includes(&text, base);
    Ok(asciidoc::to_markdown(&resolved, &conversion))
}

pub async fn search(
    project: &Project,
    terms: &[String],
    site: Option<&str>,
    lang: Option<&str>,
) -> Result<Vec<String>> {
    let (source, prefix): (Arc<dyn ContentSource>, String) = match site {
        Some(site) => (remote(site)?, "data".into()),
        None => {
            let data = project.settings.data_dir.to_string_lossy().into_owned();
            (Arc::new(DirSource::new(&project.root)), data)
        }
    };

    let state = AppState::new(source, &prefix);
    if let Some(lang) = lang {
        state.set_language(lang.parse::<Language>()?);
    }

    let data = state.loader().load().await?;
    let index = state.search_index();
    index.build(&data.entries).await;
    Ok(index.search(&terms.join(" ")))
}

#[cfg(feature = "http")]
fn remote(site: &str) -> Result<Arc<dyn ContentSource>> {
    Ok(Arc::new(anchorage::source::HttpSource::new(site)))
}

#[cfg(not(feature = "http"))]
fn remote(site: &str) -> Result<Arc<dyn ContentSource>> {
    anchorage::err!("searching a published site needs the `http` feature", "site" => site)
}
