//! The consolidated reference documents: an include-based AsciiDoc document
//! and a flattened Markdown reference for automated readers.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::asciidoc::{Conversion, Pipeline};
use crate::catalog::CategoryGroup;

pub const TITLE: &str = "Semantic Anchors — Complete Reference";

static DOCUMENT_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^= (.+)$").unwrap());

/// The AsciiDoc document including every anchor, grouped by category.
/// Anchors for which `exists` is `false` are skipped.
pub fn all_anchors_adoc<F>(categories: &[CategoryGroup], exists: F) -> String
    where F: Fn(&str) -> bool
{
    let mut lines = vec![
        format!("= {TITLE}"),
        ":toc:".into(),
        ":toc-placement: preamble".into(),
        ":toclevels: 2".into(),
        String::new(),
        "include::about.adoc[leveloffset=+1]".into(),
        String::new(),
        "<<<".into(),
        String::new(),
    ];

    for category in categories {
        lines.push(format!("== {}", category.display_name));
        lines.push(String::new());
        for id in category.member_entry_ids.iter().filter(|id| exists(id)) {
            lines.push(format!("include::anchors/{id}.adoc[leveloffset=+2]"));
            lines.push(String::new());
        }

        lines.push("<<<".into());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Everything the Markdown reference is assembled from.
pub struct LlmsInput<'a> {
    pub categories: &'a [CategoryGroup],
    /// AsciiDoc source of the introduction.
    pub about: &'a str,
    /// AsciiDoc source of each anchor, by id. Anchors without a source are
    /// skipped.
    pub sources: &'a FxHashMap<String, String>,
    pub conversion: &'a Conversion,
}

/// Splits an anchor document into its title (if any) and the rest.
fn split_title(source: &str) -> (Option<&str>, String) {
    match DOCUMENT_TITLE.captures(source) {
        Some(caps) => {
            let line = caps.get(0).map_or(0..0, |m| m.range());
            let end = match source[line.end..].starts_with('\n') {
                true => line.end + 1,
                false => line.end,
            };

            let body = format!("{}{}", &source[..line.start], &source[end..]);
            (caps.get(1).map(|m| m.as_str().trim()), body)
        }
        None => (None, source.to_string()),
    }
}

/// The flattened Markdown reference (`llms.txt`).
pub fn llms_txt(input: &LlmsInput<'_>) -> String {
    let links = &input.conversion.links;
    let total: usize = input.categories.iter().map(|c| c.member_entry_ids.len()).sum();

    let mut out = String::new();
    out.push_str(&format!("# {TITLE}\n\n"));
    out.push_str(&format!("> {total} well-defined terms, methodologies, and frameworks\n"));
    out.push_str("> that serve as precision reference points when communicating with LLMs.\n");
    out.push_str(&format!("> Source: {}\n", links.repository));
    out.push_str(&format!("> Website: {}/\n", links.site));
    out.push_str("\n---\n\n");

    let about = Pipeline::markdown(input.conversion);
    out.push_str(&about.run(input.about));
    out.push_str("\n\n---\n\n");

    let body = Pipeline::markdown(&input.conversion.clone().with_heading_offset(2));
    for category in input.categories {
        out.push_str(&format!("## {}\n\n", category.display_name));
        for id in &category.member_entry_ids {
            let Some(source) = input.sources.get(id) else {
                continue;
            };

            let (title, rest) = split_title(source);
            out.push_str(&format!("### {}\n\n", title.unwrap_or(id)));
            out.push_str(&body.run(&rest));
            out.push_str("\n\n");
        }

        out.push_str("---\n\n");
    }

    // One trailing newline.
    out.truncate(out.trim_end_matches('\n').len());
    out.push('\n');
    out
}
