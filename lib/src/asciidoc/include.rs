use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::asciidoc::map_lines;

static INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^include::([^\[\n]+)\[([^\]\n]*)\][ \t]*$").unwrap()
});

static SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(=+)([ \t]+\S.*)$").unwrap());

/// Maximum nesting of includes.
const MAX_DEPTH: usize = 8;

/// Expands `include::path[...]` directives, with paths relative to
/// `base_dir`, recursively. A `leveloffset=+N` (or `-N`) attribute shifts
/// the section levels of the included document. Unreadable targets are
/// logged and left as an `Unresolved directive` line.
pub fn resolve_includes(text: &str, base_dir: &Path) -> String {
    expand(text, base_dir, 0)
}

fn expand(text: &str, base_dir: &Path, depth: usize) -> String {
    map_lines(text, |line| {
        let caps = INCLUDE.captures(line)?;
        let (target, attributes) = (caps[1].trim(), &caps[2]);
        let path = base_dir.join(target);

        if depth >= MAX_DEPTH {
            tracing::warn!(target, depth, "include nested too deeply");
            return Some(unresolved(target, attributes));
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), "unresolved include: {e}");
                return Some(unresolved(target, attributes));
            }
        };

        let nested_base = path.parent().unwrap_or(base_dir);
        let expanded = expand(&contents, nested_base, depth + 1);
        let shifted = match level_offset(attributes) {
            0 => expanded,
            offset => shift_sections(&expanded, offset),
        };

        Some(shifted.trim_end_matches('\n').to_string())
    }).into_owned()
}

fn unresolved(target: &str, attributes: &str) -> String {
    format!("Unresolved directive - include::{target}[{attributes}]")
}

/// Parses `leveloffset=+N`, `leveloffset=-N` or `leveloffset=N` from an
/// attribute list.
fn level_offset(attributes: &str) -> i32 {
    attributes.split(',')
        .filter_map(|attr| attr.trim().strip_prefix("leveloffset="))
        .filter_map(|value| value.trim().trim_start_matches('+').parse().ok())
        .last()
        .unwrap_or(0)
}

fn shift_sections(text: &str, offset: i32) -> String {
    map_lines(text, |line| {
        let caps = SECTION.captures(line)?;
        let level = (caps[1].len() as i32 + offset).clamp(1, 6) as usize;
        Some(format!("{}{}", "=".repeat(level), &caps[2]))
    }).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_are_expanded_and_shifted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("anchors")).unwrap();
        std::fs::write(dir.path().join("anchors/tdd.adoc"), "= TDD\n\n== Origins\nKent Beck\n").unwrap();
        std::fs::write(dir.path().join("about.adoc"), "= About\ninclude::anchors/tdd.adoc[leveloffset=+1]\n").unwrap();

        let text = "= Reference\n\ninclude::about.adoc[leveloffset=+1]\n\n<<<\n";
        let resolved = resolve_includes(text, dir.path());
        assert_eq!(resolved, "= Reference\n\n== About\n=== TDD\n\n==== Origins\nKent Beck\n\n<<<\n");
    }

    #[test]
    fn missing_includes_are_left_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_includes("include::nope.adoc[leveloffset=+2]", dir.path());
        assert_eq!(resolved, "Unresolved directive - include::nope.adoc[leveloffset=+2]");
    }

    #[test]
    fn self_inclusion_stops() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("loop.adoc"), "include::loop.adoc[]\n").unwrap();

        let resolved = resolve_includes("include::loop.adoc[]", dir.path());
        assert_eq!(resolved, "Unresolved directive - include::loop.adoc[]");
    }

    #[test]
    fn level_offsets() {
        assert_eq!(level_offset("leveloffset=+2"), 2);
        assert_eq!(level_offset("tag=x, leveloffset=-1"), -1);
        assert_eq!(level_offset(""), 0);
    }
}
