use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::asciidoc::Rule;

static TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^(?:\[([^\]\n]*)\][ \t]*\n)?\|===[ \t]*\n(.*?)^\|===[ \t]*$").unwrap()
});

static COLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"cols\s*=\s*(?:"([^"]*)"|'([^']*)'|([^,\s]+))"#).unwrap()
});

/// Pipe-delimited tables become Markdown pipe tables. Ragged tables are
/// padded, never rejected.
pub struct Tables;

impl Rule for Tables {
    fn name(&self) -> &'static str { "tables" }

    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        TABLE.replace_all(input, |caps: &Captures<'_>| {
            let declared = caps.get(1).and_then(|attrs| column_count(attrs.as_str()));
            render(&caps[2], declared)
        })
    }
}

/// The number of columns declared by a `cols` attribute: `"1,2,3"` and
/// `"3*"` both declare three, as does a lone `3`.
fn column_count(attributes: &str) -> Option<usize> {
    let caps = COLS.captures(attributes)?;
    let spec = caps.get(1).or(caps.get(2)).or(caps.get(3))?.as_str().trim();
    if spec.is_empty() {
        return None;
    }

    if !spec.contains([',', ';', '*']) {
        return spec.parse().ok().filter(|n| *n > 0);
    }

    let count = spec.split([',', ';'])
        .map(|column| match column.split_once('*') {
            Some((n, _)) => n.trim().parse().ok(),
            None => Some(1),
        })
        .try_fold(0usize, |total, n: Option<usize>| total.checked_add(n.unwrap_or(1)))?;

    (count > 0).then_some(count)
}

/// Splits `line` on `|` not preceded by `\`. Text before the first
/// separator is returned as the first item.
fn split_cells(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut cells = vec![];
    let mut start = 0;
    for i in memchr::memchr_iter(b'|', bytes) {
        if i > 0 && bytes[i - 1] == b'\\' {
            continue;
        }

        cells.push(&text[start..i]);
        start = i + 1;
    }

    cells.push(&text[start..]);
    cells
}

fn render(body: &str, declared: Option<usize>) -> String {
    // Everything before the first separator is not a cell.
    let cells: Vec<String> = split_cells(body).into_iter()
        .skip(1)
        .map(|cell| cell.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    if cells.is_empty() {
        return String::new();
    }

    // A declared width wider than the whole table is not believed.
    let width = declared.filter(|&width| width <= cells.len()).unwrap_or_else(|| {
        body.lines()
            .find(|line| !line.trim().is_empty())
            .map_or(0, |line| split_cells(line).len() - 1)
            .max(1)
    });

    let mut rows = cells.chunks(width).map(|row| {
        let padding = (row.len()..width).map(|_| "");
        let cells: Vec<&str> = row.iter().map(|c| c.as_str()).chain(padding).collect();
        format!("| {} |", cells.join(" | "))
    });

    let mut table = rows.next().unwrap_or_default();
    table.push_str("\n|");
    table.push_str(&" --- |".repeat(width));
    for row in rows {
        table.push('\n');
        table.push_str(&row);
    }

    table
}
