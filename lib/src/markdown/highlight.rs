use std::fmt::Write;

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Tag, TagEnd};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use super::Plugin;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Highlights fenced code blocks into class-annotated spans with a line
/// number gutter. Unknown languages render as plain text.
#[derive(Default, Clone)]
pub struct SyntaxHighlight;

struct Highlighter<I> {
    generator: Option<ClassedHTMLGenerator<'static>>,
    lang: String,
    lines: usize,
    inner: I,
}

impl SyntaxHighlight {
    /// Loads the syntax definitions in the background.
    #[inline]
    pub fn warm_up() {
        rayon::spawn(|| { Lazy::force(&SYNTAX_SET); });
    }

    fn syntax(lang: &str) -> &'static SyntaxReference {
        SYNTAX_SET.find_syntax_by_token(lang)
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
    }
}

impl Plugin for SyntaxHighlight {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        Highlighter { generator: None, lang: String::new(), lines: 0, inner: events }
    }
}

fn code_div(lang: &str, lines: usize, code: &str) -> String {
    let mut div = String::with_capacity(code.len() + 64 + lines * 4);
    let _ = write!(div, r#"<div class="code" data-lang="{lang}" style="display: flex;">"#);
    div.push_str(r#"<pre class="line-nums">"#);
    for i in 1..=lines {
        match i < lines {
            true => { let _ = writeln!(div, "{i}"); }
            false => { let _ = write!(div, "{i}"); }
        }
    }

    let _ = write!(div, r#"</pre><pre class="code">{code}</pre></div>"#);
    div
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Highlighter<I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(label))) => {
                    let lang = label.split([',', ' ']).next().unwrap_or_default();
                    self.generator = Some(ClassedHTMLGenerator::new_with_class_style(
                        SyntaxHighlight::syntax(lang), &*SYNTAX_SET, ClassStyle::Spaced
                    ));

                    self.lang = crate::util::escape_xml(lang).into_owned();
                    self.lines = 0;
                }
                Event::Text(text) if self.generator.is_some() => {
                    if let Some(generator) = self.generator.as_mut() {
                        for line in text.split_inclusive('\n') {
                            self.lines += 1;
                            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                                tracing::warn!("failed to highlight code: {e}");
                            }
                        }
                    }
                }
                Event::End(TagEnd::CodeBlock) if self.generator.is_some() => {
                    let generator = self.generator.take()?;
                    let html = code_div(&self.lang, self.lines, &generator.finalize());
                    return Some(Event::Html(html.into()));
                }
                event => return Some(event),
            }
        }
    }
}
