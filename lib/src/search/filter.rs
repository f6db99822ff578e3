//! Lightweight filters over the dataset, usable without a search index.

use crate::catalog::CatalogEntry;

/// A text query and a set of roles to filter by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub query: String,
    pub roles: Vec<String>,
}

/// The lower-cased whitespace-separated terms of `query`.
pub(crate) fn terms(query: &str) -> Vec<String> {
    query.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

fn contains(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

fn matches_terms(entry: &CatalogEntry, terms: &[String]) -> bool {
    terms.iter().all(|term| {
        contains(&entry.title, term)
            || entry.proponents.iter().any(|p| contains(p, term))
            || entry.tags.iter().any(|t| contains(t, term))
            || contains(&entry.id, term)
    })
}

fn has_any_role(entry: &CatalogEntry, roles: &[String]) -> bool {
    roles.is_empty() || entry.roles.iter().any(|r| roles.contains(r))
}

/// Entries whose title, proponents, tags or id contain every term of
/// `query`. A blank query keeps everything.
pub fn filter_by_text<'a>(entries: &'a [CatalogEntry], query: &str) -> Vec<&'a CatalogEntry> {
    let terms = terms(query);
    entries.iter().filter(|e| matches_terms(e, &terms)).collect()
}

/// Entries with at least one of `roles`. No roles keeps everything.
pub fn filter_by_roles<'a>(entries: &'a [CatalogEntry], roles: &[String]) -> Vec<&'a CatalogEntry> {
    entries.iter().filter(|e| has_any_role(e, roles)).collect()
}

/// Applies the text filter, then the role filter.
pub fn apply_filters<'a>(entries: &'a [CatalogEntry], filters: &Filters) -> Vec<&'a CatalogEntry> {
    let terms = terms(&filters.query);
    entries.iter()
        .filter(|e| matches_terms(e, &terms))
        .filter(|e| has_any_role(e, &filters.roles))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                id: "tdd-london-school".into(),
                title: "TDD, London School".into(),
                roles: vec!["developer".into()],
                proponents: vec!["Steve Freeman".into(), "Nat Pryce".into()],
                tags: vec!["testing".into(), "mocks".into()],
                ..Default::default()
            },
            CatalogEntry {
                id: "arc42".into(),
                title: "arc42".into(),
                roles: vec!["software-architect".into()],
                proponents: vec!["Gernot Starke".into()],
                tags: vec!["documentation".into()],
                ..Default::default()
            },
        ]
    }

    fn ids(entries: Vec<&CatalogEntry>) -> Vec<&str> {
        entries.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn text_terms_are_all_required() {
        let entries = entries();
        assert_eq!(ids(filter_by_text(&entries, "freeman MOCKS")), ["tdd-london-school"]);
        assert_eq!(ids(filter_by_text(&entries, "freeman starke")), Vec::<&str>::new());
        assert_eq!(ids(filter_by_text(&entries, "arc")), ["arc42"]);
        assert_eq!(filter_by_text(&entries, "  ").len(), 2);
    }

    #[test]
    fn any_role_matches() {
        let entries = entries();
        let roles = vec!["software-architect".to_string(), "tester".to_string()];
        assert_eq!(ids(filter_by_roles(&entries, &roles)), ["arc42"]);
        assert_eq!(filter_by_roles(&entries, &[]).len(), 2);
    }

    #[test]
    fn filters_combine() {
        let entries = entries();
        let filters = Filters { query: "school".into(), roles: vec!["developer".into()] };
        assert_eq!(ids(apply_filters(&entries, &filters)), ["tdd-london-school"]);

        let filters = Filters { query: "school".into(), roles: vec!["software-architect".into()] };
        assert!(apply_filters(&entries, &filters).is_empty());

        assert_eq!(apply_filters(&entries, &Filters::default()).len(), 2);
    }
}
