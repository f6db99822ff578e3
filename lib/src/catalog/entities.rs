use std::borrow::Cow;

const NAMED: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("rsquo", "\u{2019}"),
    ("lsquo", "\u{2018}"),
    ("rdquo", "\u{201d}"),
    ("ldquo", "\u{201c}"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("nbsp", "\u{a0}"),
    ("hellip", "\u{2026}"),
];

/// Decodes decimal (`&#8217;`) and a fixed set of named (`&amp;`) HTML
/// entities. Unknown or malformed entities are left as written.
pub fn decode_html_entities(string: &str) -> Cow<'_, str> {
    if !string.contains('&') {
        return Cow::Borrowed(string);
    }

    let mut output = String::with_capacity(string.len());
    let mut rest = string;
    while let Some(i) = memchr::memchr(b'&', rest.as_bytes()) {
        output.push_str(&rest[..i]);
        rest = &rest[i..];

        let decoded = rest[1..].split_once(';')
            .filter(|(name, _)| !name.is_empty() && name.len() <= 8)
            .and_then(|(name, tail)| decode_one(name).map(|ch| (ch, tail)));

        match decoded {
            Some((ch, tail)) => {
                output.push_str(&ch);
                rest = tail;
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }

    output.push_str(rest);
    Cow::Owned(output)
}

fn decode_one(name: &str) -> Option<Cow<'static, str>> {
    if let Some(digits) = name.strip_prefix('#') {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let ch = char::from_u32(digits.parse().ok()?)?;
        return Some(Cow::Owned(ch.to_string()));
    }

    NAMED.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| Cow::Borrowed(*v))
}
