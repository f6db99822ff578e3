use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::asciidoc::{and_then, map_lines, Conversion, LinkTargets, Pipeline, Rule, Substitute};
use crate::asciidoc::table::Tables;
use crate::asciidoc::emphasis::Emphasis;

macro_rules! regex {
    ($name:ident = $re:literal) => (
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).unwrap());
    )
}

regex!(CRLF = r"\r\n?");
regex!(ATTRIBUTE = r"(?m)^:!?[A-Za-z0-9_][A-Za-z0-9_-]*!?:(?:[ \t].*)?$");
regex!(HEADING = r"^(={1,6})[ \t]+(\S.*)$");
regex!(SOURCE_BLOCK = r"(?m)^\[source(?:,([^\]\n]*))?\][ \t]*\n(?:-{4}|\.{4})[ \t]*$");
regex!(CODE_DELIMITER = r"(?m)^(?:-{4}|\.{4})[ \t]*$");
regex!(QUOTE_BLOCK = r"(?ms)^(?:\[(?:quote|verse)[^\]\n]*\][ \t]*\n)?_{4}[ \t]*\n(.*?)^_{4}[ \t]*$");
regex!(SIDEBAR_DELIMITER = r"(?m)^(?:\*{4}|={4}|\[%collapsible[^\]\n]*\])[ \t]*$");
regex!(BLOCK_TITLE = r"^\.([^.\s].*)$");
regex!(ADMONITION = r"^(NOTE|TIP|IMPORTANT|WARNING|CAUTION):[ \t]+(.*)$");
regex!(ADMONITION_BLOCK = r"^\[(NOTE|TIP|IMPORTANT|WARNING|CAUTION)\][ \t]*$");
regex!(BLOCK_ATTRIBUTE = r"(?m)^(?:\[(?:horizontal|sidebar|example|listing|literal|source[^\]\n]*|cols[^\]\n]*|options[^\]\n]*|%[^\]\n]*|role=[^\]\n]*|\.[^\]\n]*|#[^\]\n]*)\]|\[\[[^\]\n]+\]\]|<<<)[ \t]*$");
regex!(MACRO_LINK = r"link:([^\s\[]+)\[([^\]\n]*)\]");
regex!(BARE_LINK = r"(https?://[^\s\[\]<>()]+)\[([^\]\n]*)\]");
regex!(XREF_TEXT = r"<<([^,>\n]+),[ \t]*([^>\n]+)>>");
regex!(XREF = r"<<([^>\n]+)>>");
regex!(XREF_MACRO = r"xref:([^\s\[]+)\[([^\]\n]*)\]");
regex!(NESTED_TERM = r"^[ \t]*([^:\s|#>`][^\n]*?):::(?:[ \t]+(.*?))?[ \t]*$");
regex!(TERM = r"^([^:\s|#>`*\-][^\n]*?)::(?:[ \t]+(.*?))?[ \t]*$");
regex!(ORDERED_ITEM = r"^(\.{1,5})[ \t]+(\S.*)$");
regex!(NESTED_BULLET = r"^(\*{2,5})[ \t]+(\S.*)$");
regex!(TRAILING_SPACE = r"(?m)[ \t]+$");
regex!(BLANK_LINES = r"\n{3,}");

static NORMALIZE_NEWLINES: Substitute = Substitute::new("normalize-newlines", &CRLF, "\n");
static ATTRIBUTES: Substitute = Substitute::new("attributes", &ATTRIBUTE, "");

pub fn markdown(conversion: &Conversion) -> Pipeline {
    Pipeline::new()
        .rule(&NORMALIZE_NEWLINES)
        .rule(&ATTRIBUTES)
        .rule(Headings { offset: conversion.heading_offset })
        .rule(CodeBlocks)
        .rule(Quotes)
        .rule(Sidebars)
        .rule(Tables)
        .rule(Admonitions)
        .rule(BlockAttributes)
        .rule(Continuations)
        .rule(Links { targets: conversion.links.clone() })
        .rule(Xrefs)
        .rule(DefinitionLists)
        .rule(Emphasis)
        .rule(Lists)
        .rule(Whitespace)
}

impl<R: Rule + ?Sized> Rule for &'static R {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (**self).apply(input)
    }
}

/// `=` x N becomes `#` x (N + offset), clamped to `1..=6`.
pub struct Headings {
    pub offset: i8,
}

impl Rule for Headings {
    fn name(&self) -> &'static str { "headings" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        map_lines(input, |line| {
            let caps = HEADING.captures(line)?;
            let level = (caps[1].len() as i16 + self.offset as i16).clamp(1, 6) as usize;
            Some(format!("{} {}", "#".repeat(level), &caps[2]))
        })
    }
}

pub struct CodeBlocks;

impl Rule for CodeBlocks {
    fn name(&self) -> &'static str { "code-blocks" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let opened = SOURCE_BLOCK.replace_all(input, |caps: &Captures<'_>| {
            let lang = caps.get(1)
                .and_then(|attrs| attrs.as_str().split(',').next())
                .map_or("", str::trim);

            format!("```{lang}")
        });

        and_then(opened, |text| CODE_DELIMITER.replace_all(text, "```"))
    }
}

pub struct Quotes;

impl Rule for Quotes {
    fn name(&self) -> &'static str { "quotes" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        QUOTE_BLOCK.replace_all(input, |caps: &Captures<'_>| {
            caps[1].trim_matches('\n')
                .lines()
                .map(|line| match line.trim_end() {
                    "" => ">".to_string(),
                    line => format!("> {line}"),
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

/// Drops sidebar, example and collapsible delimiters, keeping the content;
/// block titles become bold lines.
pub struct Sidebars;

impl Rule for Sidebars {
    fn name(&self) -> &'static str { "sidebars" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let stripped = SIDEBAR_DELIMITER.replace_all(input, "");
        and_then(stripped, |text| map_lines(text, |line| {
            BLOCK_TITLE.captures(line).map(|caps| format!("**{}**", caps[1].trim_end()))
        }))
    }
}

pub struct Admonitions;

fn admonition_label(kind: &str) -> &'static str {
    match kind {
        "NOTE" => "Note",
        "TIP" => "Tip",
        "IMPORTANT" => "Important",
        "WARNING" => "Warning",
        _ => "Caution",
    }
}

impl Rule for Admonitions {
    fn name(&self) -> &'static str { "admonitions" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        map_lines(input, |line| {
            if let Some(caps) = ADMONITION.captures(line) {
                return Some(format!("> **{}:** {}", admonition_label(&caps[1]), &caps[2]));
            }

            ADMONITION_BLOCK.captures(line)
                .map(|caps| format!("**{}:**", admonition_label(&caps[1])))
        })
    }
}

/// Drops block attribute lines no other rule consumed, block anchors and
/// page breaks.
pub struct BlockAttributes;

impl Rule for BlockAttributes {
    fn name(&self) -> &'static str { "block-attributes" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        BLOCK_ATTRIBUTE.replace_all(input, "")
    }
}

/// Drops lone `+` list continuation lines and trailing ` +` hard breaks.
pub struct Continuations;

impl Rule for Continuations {
    fn name(&self) -> &'static str { "continuations" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        map_lines(input, |line| {
            let trimmed = line.trim_end();
            if trimmed == "+" {
                return Some(String::new());
            }

            let head = trimmed.strip_suffix('+')?;
            match head.ends_with([' ', '\t']) {
                true => Some(head.trim_end().to_string()),
                false => None,
            }
        })
    }
}

pub struct Links {
    pub targets: LinkTargets,
}

impl Links {
    /// Resolves a link target that only makes sense inside the repository.
    pub fn resolve<'u>(&self, url: &'u str) -> Cow<'u, str> {
        let targets = &self.targets;
        if url.starts_with("../") || url.starts_with("./") {
            let mut path = url;
            while let Some(rest) = path.strip_prefix("../").or_else(|| path.strip_prefix("./")) {
                path = rest;
            }

            return format!("{}/blob/{}/{path}", targets.repository, targets.branch).into();
        }

        if url.starts_with("#/") {
            return format!("{}/{url}", targets.site).into();
        }

        Cow::Borrowed(url)
    }

    fn link(&self, caps: &Captures<'_>) -> String {
        let url = self.resolve(&caps[1]);
        let text = caps[2].trim().trim_end_matches('^');
        let text = text.split(",window=").next().unwrap_or(text).trim();
        match text.is_empty() {
            true => format!("[{url}]({url})"),
            false => format!("[{text}]({url})"),
        }
    }
}

impl Rule for Links {
    fn name(&self) -> &'static str { "links" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let linked = MACRO_LINK.replace_all(input, |caps: &Captures<'_>| self.link(caps));
        and_then(linked, |text| BARE_LINK.replace_all(text, |caps: &Captures<'_>| self.link(caps)))
    }
}

/// Cross references render as their text, or the target id as code.
pub struct Xrefs;

impl Rule for Xrefs {
    fn name(&self) -> &'static str { "xrefs" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let text = XREF_TEXT.replace_all(input, |caps: &Captures<'_>| caps[2].trim().to_string());
        let text = and_then(text, |text| XREF.replace_all(text, "`$1`"));
        and_then(text, |text| XREF_MACRO.replace_all(text, |caps: &Captures<'_>| {
            match caps[2].trim() {
                "" => format!("`{}`", &caps[1]),
                label => label.to_string(),
            }
        }))
    }
}

/// `term::: desc` becomes `- **term**: desc`; then `term:: desc` becomes
/// `**term**: desc`.
pub struct DefinitionLists;

fn definition(caps: &Captures<'_>, prefix: &str) -> String {
    let term = caps[1].trim();
    match caps.get(2).map(|d| d.as_str().trim()).filter(|d| !d.is_empty()) {
        Some(desc) => format!("{prefix}**{term}**: {desc}"),
        None => format!("{prefix}**{term}**"),
    }
}

impl Rule for DefinitionLists {
    fn name(&self) -> &'static str { "definition-lists" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        map_lines(input, |line| {
            if let Some(caps) = NESTED_TERM.captures(line) {
                return Some(definition(&caps, "- "));
            }

            TERM.captures(line).map(|caps| definition(&caps, ""))
        })
    }
}

/// `. item` becomes `1. item`; deeper ordered items and `**` bullets are
/// indented beneath their parent.
pub struct Lists;

impl Rule for Lists {
    fn name(&self) -> &'static str { "lists" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        map_lines(input, |line| {
            if let Some(caps) = ORDERED_ITEM.captures(line) {
                let indent = " ".repeat(3 * (caps[1].len() - 1));
                return Some(format!("{indent}1. {}", &caps[2]));
            }

            NESTED_BULLET.captures(line).map(|caps| {
                let indent = " ".repeat(2 * (caps[1].len() - 1));
                format!("{indent}- {}", &caps[2])
            })
        })
    }
}

pub struct Whitespace;

impl Rule for Whitespace {
    fn name(&self) -> &'static str { "whitespace" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let text = TRAILING_SPACE.replace_all(input, "");
        match and_then(text, |text| BLANK_LINES.replace_all(text, "\n\n")) {
            Cow::Borrowed(text) => Cow::Borrowed(text.trim()),
            Cow::Owned(text) => Cow::Owned(text.trim().to_string()),
        }
    }
}
