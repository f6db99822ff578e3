use std::borrow::Cow;

use crate::asciidoc::{map_lines, Rule};

/// Single-asterisk spans become double-asterisk (strong) spans.
///
/// An opening `*` may not follow a word character or another `*`, and must
/// be followed by something other than whitespace or `*`. The span ends at
/// the next `*` on the line, which may not be followed by a word character
/// or `*`. Existing `**strong**` spans and `* bullets` never qualify.
pub struct Emphasis;

impl Rule for Emphasis {
    fn name(&self) -> &'static str { "emphasis" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        map_lines(input, |line| match strengthen(line) {
            Cow::Owned(line) => Some(line),
            Cow::Borrowed(_) => None,
        })
    }
}

fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn strengthen(line: &str) -> Cow<'_, str> {
    let bytes = line.as_bytes();
    let mut output: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;
    while let Some(k) = memchr::memchr(b'*', &bytes[i..]) {
        let open = i + k;
        let before = open.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(open + 1).copied();

        let opens = !before.map_or(false, |b| b == b'*' || is_word(b))
            && after.map_or(false, |b| b != b'*' && !b.is_ascii_whitespace());

        let close = match opens {
            true => memchr::memchr(b'*', &bytes[open + 1..]).map(|j| open + 1 + j),
            false => None,
        };

        let closes = close.map_or(false, |close| {
            !bytes.get(close + 1).map_or(false, |&b| b == b'*' || is_word(b))
        });

        match (close, closes) {
            (Some(close), true) => {
                let out = output.get_or_insert_with(|| String::with_capacity(line.len() + 8));
                out.push_str(&line[copied..open]);
                out.push_str("**");
                out.push_str(&line[open + 1..close]);
                out.push_str("**");
                copied = close + 1;
                i = close + 1;
            }
            _ => i = open + 1,
        }
    }

    match output {
        Some(mut output) => {
            output.push_str(&line[copied..]);
            Cow::Owned(output)
        }
        None => Cow::Borrowed(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong(input: &str) -> String {
        Emphasis.apply(input).into_owned()
    }

    #[test]
    fn single_spans_become_strong() {
        assert_eq!(strong("*Full Name*: TDD"), "**Full Name**: TDD");
        assert_eq!(strong("an *a* and *b*."), "an **a** and **b**.");
    }

    #[test]
    fn strong_spans_and_bullets_pass_through() {
        for line in ["**already strong**", "* bullet item", "** nested *x* item", "2*3*4", "a * b"] {
            let expected = match line {
                "** nested *x* item" => "** nested **x** item",
                other => other,
            };

            assert_eq!(strong(line), expected);
        }
    }

    #[test]
    fn closer_must_end_the_word() {
        assert_eq!(strong("*not*closed"), "*not*closed");
        assert_eq!(strong("*one*two* three*"), "*one*two* three*");
        assert_eq!(strong("(*see*)"), "(**see**)");
    }

    #[test]
    fn fenced_code_is_skipped() {
        let text = "```\nlet x = *ptr*;\n```\n*y*";
        assert_eq!(strong(text), "```\nlet x = *ptr*;\n```\n**y**");
    }
}
