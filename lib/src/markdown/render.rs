use std::fs;
use std::path::Path;

use pulldown_cmark::{html, Options, Parser};

use crate::asciidoc::{resolve_includes, Conversion, Pipeline};
use crate::catalog::parse_attributes;
use crate::error::{Chainable, Result};
use crate::markdown::{AutoHeading, HeadingAnchor, Plugin, SyntaxHighlight, TableOfContents, TocEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a `<nav id="toc">` before the body.
    pub toc: bool,
    /// Heading depth of the table of contents, below the document title.
    pub toc_levels: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { toc: false, toc_levels: 2 }
    }
}

/// A rendered HTML fragment and its heading tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Renders `markdown` to HTML.
pub fn render(markdown: &str, options: RenderOptions) -> Result<Page> {
    let mut headings = AutoHeading::default();
    let mut anchors = HeadingAnchor;
    let mut highlight = SyntaxHighlight;
    let mut toc = TableOfContents::new(options.toc_levels);

    let input = highlight.preprocess(markdown)?;
    let mut body = String::with_capacity(input.len() * 3 / 2);
    {
        let events = Parser::new_ext(&input, self::options());
        let events = headings.remap(events);
        let events = toc.remap(events);
        let events = anchors.remap(events);
        let events = highlight.remap(events);
        html::push_html(&mut body, events);
    }

    headings.finalize()?;
    toc.finalize()?;
    anchors.finalize()?;
    highlight.finalize()?;

    let html = match options.toc && !toc.entries.is_empty() {
        true => format!("{}\n{body}", toc.to_html()),
        false => body,
    };

    Ok(Page { html, toc: toc.entries })
}

/// Reads the AsciiDoc document at `path`, expands its includes, converts it
/// to Markdown and renders it. A `:toc:` attribute turns on the table of
/// contents, `:toclevels:` sets its depth.
pub fn render_page(path: &Path, conversion: &Conversion) -> Result<Page> {
    let source = fs::read_to_string(path).chain_with(|| error! {
        "failed to read page source",
        "path" => path.display(),
    })?;

    let base = path.parent().unwrap_or(Path::new("."));
    let expanded = resolve_includes(&source, base);
    let attributes = parse_attributes(&expanded);
    let options = RenderOptions {
        toc: attributes.contains("toc"),
        toc_levels: attributes.get("toclevels")
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(2),
    };

    let markdown = Pipeline::markdown(conversion).run(&expanded);
    render(&markdown, options).chain_with(|| error! {
        "failed to render page",
        "path" => path.display(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_get_unique_anchored_ids() {
        let page = render("# Title\n\n## Usage\n\n## Usage\n\n## Usage", RenderOptions::default()).unwrap();
        assert!(page.html.contains(r#"<h2 id="usage">"#));
        assert!(page.html.contains(r#"<h2 id="usage-1">"#));
        assert!(page.html.contains(r#"<h2 id="usage-2">"#));
        assert!(page.html.contains(r##"<a class="anchor" title="anchor" href="#usage-1"></a>"##));
    }

    #[test]
    fn generated_ids_never_collide() {
        let page = render("## Usage\n\n## Usage\n\n## Usage 1\n\n## Intro {#setup}\n\n## Setup", RenderOptions::default()).unwrap();
        let ids: Vec<_> = page.html.match_indices(r#"<h2 id=""#)
            .map(|(i, m)| &page.html[i + m.len()..])
            .map(|rest| &rest[..rest.find('"').unwrap()])
            .collect();

        assert_eq!(ids, ["usage", "usage-1", "usage-1-1", "setup", "setup-1"]);
    }

    #[test]
    fn toc_nests_sections_below_the_title() {
        let md = "# Doc\n\n## One\n\n### One A\n\n#### Too deep\n\n## Two `code`";
        let page = render(md, RenderOptions { toc: true, toc_levels: 2 }).unwrap();

        let titles: Vec<_> = page.toc.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two code"]);
        assert_eq!(page.toc[0].children.len(), 1);
        assert_eq!(page.toc[0].children[0].id.as_deref(), Some("one-a"));
        assert!(page.html.starts_with(r##"<nav id="toc"><ul><li><a href="#one">One</a>"##));
    }

    #[test]
    fn code_blocks_are_highlighted() {
        let page = render("```rust\nfn main() {}\nlet x = 1;\n```", RenderOptions::default()).unwrap();
        assert!(page.html.contains(r#"<div class="code" data-lang="rust""#));
        assert!(page.html.contains(r#"<pre class="line-nums">1
2</pre>"#));
        assert!(!page.html.contains("<code"));
    }

    #[test]
    fn renders_an_asciidoc_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.adoc"), "= Part\n\nIncluded *text*.\n").unwrap();
        std::fs::write(dir.path().join("page.adoc"), "= Page\n:toc:\n\ninclude::part.adoc[leveloffset=+1]\n").unwrap();

        let page = render_page(&dir.path().join("page.adoc"), &Conversion::default()).unwrap();
        assert!(page.html.starts_with(r#"<nav id="toc">"#));
        assert!(page.html.contains(r#"<h2 id="part">"#));
        assert!(page.html.contains("<strong>text</strong>"));
    }

    #[test]
    fn missing_page_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = render_page(&dir.path().join("nope.adoc"), &Conversion::default()).unwrap_err();
        assert!(error.to_string().contains("failed to read page source"));
    }
}
