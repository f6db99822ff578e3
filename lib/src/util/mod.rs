use std::borrow::Cow;

/// Convert spaces to hyphens. Remove characters that aren't alphanumerics,
/// underscores, or hyphens. Convert to lowercase. Also strip leading and
/// trailing whitespace.
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        // deunicode drops some control characters entirely; they still
        // separate words.
        if ch.is_whitespace() || ch.is_control() {
            need_dash = !output.is_empty();
            continue;
        }

        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                _ => {
                    // All runs of characters that aren't alphanumeric or `_`
                    // collapse into a single `-`.
                    need_dash = !output.is_empty();
                }
            }
        }
    }

    output
}

/// Turns a hyphenated identifier into capitalized words:
/// `"domain-driven-design"` becomes `"Domain Driven Design"`.
pub fn title_case(id: &str) -> String {
    id.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escapes the five XML special characters.
pub fn escape_xml(string: &str) -> Cow<'_, str> {
    if !string.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(string);
    }

    let mut output = String::with_capacity(string.len() + 8);
    for ch in string.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&apos;"),
            _ => output.push(ch),
        }
    }

    Cow::Owned(output)
}

/// Returns `true` if byte index `i` of `string` begins a line.
#[inline]
pub fn is_line_start(i: usize, string: &str) -> bool {
    i == 0 || string.as_bytes().get(i - 1).map_or(false, |b| *b == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Test String!!!1!1"), "my-test-string-1-1");
        assert_eq!(slugify("test\nit   now!"), "test-it-now");
        assert_eq!(slugify("  --test_-_cool- -  "), "test_-_cool");
        assert_eq!(slugify("Æúű--cool?"), "aeuu-cool");
        assert_eq!(slugify("You & Me"), "you-me");
        assert_eq!(slugify("Core Concepts: TDD"), "core-concepts-tdd");
        assert_eq!(slugify("tab\tand\r\nlines\u{0}end"), "tab-and-lines-end");
        assert_eq!(slugify("\n\tlead"), "lead");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("domain-driven-design"), "Domain Driven Design");
        assert_eq!(title_case("qa"), "Qa");
        assert_eq!(title_case("--odd--id"), "Odd Id");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert!(matches!(escape_xml("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_xml("Tom & \"Jerry\" <3"), "Tom &amp; &quot;Jerry&quot; &lt;3");
    }

    #[test]
    fn test_is_line_start() {
        let text = "ab\ncd";
        assert!(is_line_start(0, text));
        assert!(!is_line_start(1, text));
        assert!(is_line_start(3, text));
    }
}
