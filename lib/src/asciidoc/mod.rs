//! AsciiDoc to Markdown (and plain text) conversion.
//!
//! A [`Pipeline`] is an ordered list of [`Rule`]s, each a named, pure text
//! transform. Rules never fail: malformed input degrades to imperfect output.
//! Order matters; for instance nested definition lists are rewritten before
//! top-level ones, and table attribute lines are consumed by the table rule
//! before residual block attributes are dropped.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

mod rules;
mod table;
mod emphasis;
mod plain;
mod include;

pub use include::resolve_includes;

/// A named, infallible text transform.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transforms `input`, returning it borrowed when nothing changed.
    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// Where rewritten links point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTargets {
    /// Repository root, e.g. `https://github.com/org/repo`.
    pub repository: String,
    pub branch: String,
    /// Published site root.
    pub site: String,
}

impl Default for LinkTargets {
    fn default() -> Self {
        crate::config::Settings::default().link_targets()
    }
}

/// Parameters of a Markdown conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub links: LinkTargets,
    /// Added to every heading level; results are clamped to `1..=6`.
    pub heading_offset: i8,
}

impl Conversion {
    pub fn with_heading_offset(mut self, offset: i8) -> Self {
        self.heading_offset = offset;
        self
    }
}

/// A regex substitution rule.
pub struct Substitute {
    name: &'static str,
    regex: &'static Lazy<Regex>,
    replacement: &'static str,
}

impl Substitute {
    pub const fn new(name: &'static str, regex: &'static Lazy<Regex>, replacement: &'static str) -> Self {
        Substitute { name, regex, replacement }
    }
}

impl Rule for Substitute {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.regex.replace_all(input, self.replacement)
    }
}

/// An ordered sequence of rules.
#[derive(Default)]
pub struct Pipeline {
    rules: Vec<Box<dyn Rule>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    /// Appends `rule` to the end of the pipeline.
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// The AsciiDoc to Markdown conversion.
    pub fn markdown(conversion: &Conversion) -> Self {
        rules::markdown(conversion)
    }

    /// The AsciiDoc to lower-cased searchable text conversion.
    pub fn plain_text() -> Self {
        plain::plain_text()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    pub fn run(&self, input: &str) -> String {
        let mut text = input.to_string();
        for rule in &self.rules {
            let next = match rule.apply(&text) {
                Cow::Owned(changed) => Some(changed),
                Cow::Borrowed(same) if same.len() == text.len() => None,
                Cow::Borrowed(slice) => Some(slice.to_string()),
            };

            if let Some(changed) = next {
                text = changed;
            }
        }

        text
    }
}

/// Converts `adoc` to Markdown.
pub fn to_markdown(adoc: &str, conversion: &Conversion) -> String {
    Pipeline::markdown(conversion).run(adoc)
}

/// Applies `f` to `text`, keeping `text` itself when `f` changes nothing.
pub(crate) fn and_then<'a, F>(text: Cow<'a, str>, f: F) -> Cow<'a, str>
    where F: FnOnce(&str) -> Cow<'_, str>
{
    let changed = match f(&text) {
        Cow::Owned(changed) => Some(changed),
        Cow::Borrowed(same) if same.len() == text.len() => None,
        Cow::Borrowed(slice) => Some(slice.to_string()),
    };

    match changed {
        Some(changed) => Cow::Owned(changed),
        None => text,
    }
}

/// Returns `true` if `line` opens or closes a verbatim block, in either
/// AsciiDoc (`----`, `....`) or Markdown (```` ``` ````) form.
fn is_fence(line: &str) -> bool {
    let line = line.trim_end();
    line == "----" || line == "...." || line.starts_with("```")
}

/// Calls `f` on every line outside verbatim blocks, without its newline.
/// `f` returns the replacement line, or `None` to keep the line as is.
pub(crate) fn map_lines<'a, F>(input: &'a str, mut f: F) -> Cow<'a, str>
    where F: FnMut(&str) -> Option<String>
{
    let mut output: Option<String> = None;
    let mut in_code = false;
    let mut offset = 0;
    for raw in input.split_inclusive('\n') {
        let (line, newline) = match raw.strip_suffix('\n') {
            Some(line) => (line, "\n"),
            None => (raw, ""),
        };

        let replacement = if is_fence(line) {
            in_code = !in_code;
            None
        } else if in_code {
            None
        } else {
            f(line)
        };

        match (replacement, &mut output) {
            (Some(new), Some(out)) => {
                out.push_str(&new);
                out.push_str(newline);
            }
            (Some(new), None) => {
                let mut out = input[..offset].to_string();
                out.push_str(&new);
                out.push_str(newline);
                output = Some(out);
            }
            (None, Some(out)) => out.push_str(raw),
            (None, None) => {}
        }

        offset += raw.len();
    }

    match output {
        Some(output) => Cow::Owned(output),
        None => Cow::Borrowed(input),
    }
}
