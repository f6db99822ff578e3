use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::asciidoc::{Pipeline, Rule, Substitute};

macro_rules! strip {
    ($name:ident, $rule:literal, $re:literal => $with:literal) => (
        static $name: Substitute = {
            static REGEX: Lazy<Regex> = Lazy::new(|| Regex::new($re).unwrap());
            Substitute::new($rule, &REGEX, $with)
        };
    )
}

strip!(NEWLINES, "normalize-newlines", r"\r\n?" => "\n");
strip!(ATTRIBUTES, "attributes", r"(?m)^:[^:\n]+:.*$" => "");
strip!(HEADINGS, "headings", r"(?m)^=+[ \t]+" => "");
strip!(DELIMITERS, "delimiters", r"(?m)^(?:[*_=.-]{4,}|\|===)[ \t]*$" => "");
strip!(LINKS, "links", r"link:[^\[\n]+\[([^\]\n]+)\]" => "$1");
strip!(XREFS_TEXT, "xrefs-with-text", r"<<[^,>\n]+,([^>\n]+)>>" => "$1");
strip!(XREFS, "xrefs", r"<<([^>\n]+)>>" => "$1");
strip!(STRONG, "strong", r"\*\*([^*\n]+)\*\*" => "$1");
strip!(EMPHASIS, "emphasis", r"\*([^*\n]+)\*" => "$1");
strip!(ITALIC, "italic", r"_([^_\n]+)_" => "$1");
strip!(CODE, "code", r"`([^`\n]+)`" => "$1");
strip!(BULLETS, "bullets", r"(?m)^[*-][ \t]+" => "");
strip!(NUMBERED, "numbered", r"(?m)^(?:\d+|\.+)\.?[ \t]+" => "");
strip!(SOURCE, "source-attributes", r"\[source[^\]\n]*\]" => "");
strip!(BLANK_LINES, "blank-lines", r"\n{3,}" => "\n\n");

/// Trims the document and lower-cases it.
struct Fold;

impl Rule for Fold {
    fn name(&self) -> &'static str { "fold" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        Cow::Owned(input.trim().to_lowercase())
    }
}

pub fn plain_text() -> Pipeline {
    Pipeline::new()
        .rule(&NEWLINES)
        .rule(&ATTRIBUTES)
        .rule(&HEADINGS)
        .rule(&DELIMITERS)
        .rule(&LINKS)
        .rule(&XREFS_TEXT)
        .rule(&XREFS)
        .rule(&STRONG)
        .rule(&EMPHASIS)
        .rule(&ITALIC)
        .rule(&CODE)
        .rule(&BULLETS)
        .rule(&NUMBERED)
        .rule(&SOURCE)
        .rule(&BLANK_LINES)
        .rule(Fold)
}

#[cfg(test)]
mod tests {
    use crate::asciidoc::Pipeline;

    #[test]
    fn strips_markup_to_searchable_text() {
        let adoc = "\
= Clean Architecture
:categories: architecture-design
:roles: software-architect

[%collapsible]
====
*Core idea*: dependencies point **inward**, see <<hexagonal,Ports and Adapters>> and <<onion>>.

* Entities
. Use cases
. Read link:https://blog.cleancoder.com[_The Blog_]

[source,java]
----
`interface` Gateway {}
----
====
";
        let text = Pipeline::plain_text().run(adoc);
        assert_eq!(text, "\
clean architecture

[%collapsible]

core idea: dependencies point inward, see ports and adapters and onion.

entities
use cases
read the blog

interface gateway {}");
    }

    #[test]
    fn blank_input_stays_blank() {
        assert_eq!(Pipeline::plain_text().run("  \n\n"), "");
    }
}
