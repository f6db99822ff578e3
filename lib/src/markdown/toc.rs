use std::fmt::Write;

use pulldown_cmark::{Event, Tag, TagEnd};
use serde::Serialize;

use crate::markdown::Plugin;
use crate::util::escape_xml;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub level: usize,
    pub id: Option<String>,
    pub children: Vec<TocEntry>,
}

/// Collects headings into a tree. The document title (level 1) is left out,
/// as are headings deeper than `levels` below it.
#[derive(Debug, Clone)]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
    levels: usize,
    entry: Option<TocEntry>,
}

impl TableOfContents {
    pub fn new(levels: usize) -> Self {
        TableOfContents { entries: vec![], levels, entry: None }
    }

    pub fn reset(&mut self) {
        self.entries = vec![];
        self.entry = None;
    }

    fn insert(entries: &mut Vec<TocEntry>, entry: TocEntry) {
        match entries.last_mut() {
            Some(last) if last.level < entry.level => Self::insert(&mut last.children, entry),
            _ => entries.push(entry),
        }
    }

    /// Renders the collected entries as a nested list.
    pub fn to_html(&self) -> String {
        fn list(html: &mut String, entries: &[TocEntry]) {
            html.push_str("<ul>");
            for entry in entries {
                let title = escape_xml(&entry.title);
                let _ = match &entry.id {
                    Some(id) => write!(html, r##"<li><a href="#{id}">{title}</a>"##),
                    None => write!(html, "<li>{title}"),
                };

                if !entry.children.is_empty() {
                    list(html, &entry.children);
                }

                html.push_str("</li>");
            }

            html.push_str("</ul>");
        }

        let mut html = String::from(r#"<nav id="toc">"#);
        list(&mut html, &self.entries);
        html.push_str("</nav>");
        html
    }
}

impl Default for TableOfContents {
    fn default() -> Self {
        TableOfContents::new(2)
    }
}

impl Plugin for TableOfContents {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        self.reset();
        events.inspect(|ev| match ev {
            Event::Start(Tag::Heading { level, id, .. }) => {
                let level = *level as usize;
                if level > 1 && level <= self.levels + 1 {
                    self.entry = Some(TocEntry {
                        title: String::new(),
                        level,
                        id: id.as_ref().map(|id| id.to_string()),
                        children: vec![],
                    });
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.title.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(..)) => {
                if let Some(entry) = self.entry.take() {
                    Self::insert(&mut self.entries, entry);
                }
            }
            _ => {}
        })
    }
}
