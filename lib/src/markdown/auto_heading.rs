use std::collections::VecDeque;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use rustc_hash::FxHashMap;

use super::Plugin;

/// Gives every heading without an explicit id a slug id. Repeated slugs get
/// `-1`, `-2`, ... suffixes, skipping any id already taken.
#[derive(Default)]
pub struct AutoHeading {
    seen: FxHashMap<String, usize>,
}

struct Slugged<'a, 's, I: Iterator<Item = Event<'a>>> {
    queue: VecDeque<Event<'a>>,
    seen: &'s mut FxHashMap<String, usize>,
    inner: I,
}

impl<'a, I: Iterator<Item = Event<'a>>> Slugged<'a, '_, I> {
    fn unique(&mut self, text: &str) -> String {
        let slug = crate::util::slugify(text);
        let slug = if slug.is_empty() { "section".to_string() } else { slug };
        let id = match self.seen.get(&slug).copied() {
            None => slug,
            Some(mut next) => {
                // Skip suffixes that are already some other heading's id.
                let id = loop {
                    let id = format!("{slug}-{next}");
                    next += 1;
                    if !self.seen.contains_key(&id) {
                        break id;
                    }
                };

                self.seen.insert(slug, next);
                id
            }
        };

        self.seen.insert(id.clone(), 1);
        id
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Slugged<'a, '_, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.queue.pop_front() {
            return Some(event);
        }

        match self.inner.next()? {
            Event::Start(Tag::Heading { level, id: None, classes, attrs }) => {
                let mut text = String::new();
                loop {
                    let event = self.inner.next()?;
                    match event {
                        Event::Text(ref s) | Event::Code(ref s) => text.push_str(s),
                        Event::End(TagEnd::Heading(..)) => break,
                        _ => {}
                    }

                    self.queue.push_back(event);
                }

                let id = self.unique(&text);
                self.queue.push_back(Event::End(TagEnd::Heading(level)));
                Some(Event::Start(Tag::Heading { level, id: Some(id.into()), classes, attrs }))
            }
            Event::Start(Tag::Heading { level, id: Some(id), classes, attrs }) => {
                self.seen.entry(id.to_string()).or_insert(1);
                Some(Event::Start(Tag::Heading { level, id: Some(id), classes, attrs }))
            }
            event => Some(event),
        }
    }
}

impl Plugin for AutoHeading {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        Slugged { queue: VecDeque::with_capacity(4), seen: &mut self.seen, inner: events }
    }
}

/// Emits a self-link after the opening tag of every heading with an id.
#[derive(Default)]
pub struct HeadingAnchor;

struct Anchored<'a, I: Iterator<Item = Event<'a>>> {
    pending: Option<CowStr<'a>>,
    inner: I,
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Anchored<'a, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(id) = self.pending.take() {
            let html = format!(r##"<a class="anchor" title="anchor" href="#{id}"></a>"##);
            return Some(Event::Html(html.into()));
        }

        let event = self.inner.next()?;
        if let Event::Start(Tag::Heading { id: Some(ref id), .. }) = event {
            self.pending = Some(id.clone());
        }

        Some(event)
    }
}

impl Plugin for HeadingAnchor {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        Anchored { pending: None, inner: events }
    }
}
