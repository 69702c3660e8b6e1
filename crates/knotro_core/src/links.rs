//! Link-list helpers used by backlink reconciliation.
//!
//! # Responsibility
//! - Derive outgoing links from `[[wikilink]]` markup in note content.
//! - Normalize declared link lists and compute added/removed deltas.
//!
//! # Invariants
//! - Empty names never take part in a delta.
//! - `[[~name]]` is an escaped literal, not a link.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(.*?)\]\]").expect("valid wikilink regex"));

const ESCAPE_PREFIX: char = '~';

/// Extracts unique link targets from `[[name]]` markup, in order of first
/// appearance.
pub fn extract_wikilinks(content: &str) -> Vec<String> {
    let targets = WIKILINK_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !name.starts_with(ESCAPE_PREFIX))
        .map(str::to_string);
    unique_non_empty(targets)
}

/// Drops empty entries and repeated names, keeping first-occurrence order.
pub fn normalize_links(links: &[String]) -> Vec<String> {
    unique_non_empty(links.iter().cloned())
}

/// Names in `from` that do not appear in `other`, both normalized first.
pub fn link_diff(from: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<String> = normalize_links(other).into_iter().collect();
    normalize_links(from)
        .into_iter()
        .filter(|name| !other.contains(name))
        .collect()
}

fn unique_non_empty(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{extract_wikilinks, link_diff, normalize_links};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn extracts_links_in_first_occurrence_order() {
        let links = extract_wikilinks("see [[beta]] then [[alpha]] and [[beta]] again");
        assert_eq!(links, names(&["beta", "alpha"]));
    }

    #[test]
    fn escaped_and_empty_links_are_skipped() {
        let links = extract_wikilinks("[[~literal]] [[]] [[real]]");
        assert_eq!(links, names(&["real"]));
    }

    #[test]
    fn plain_text_has_no_links() {
        assert!(extract_wikilinks("nothing [here] at all").is_empty());
    }

    #[test]
    fn normalize_drops_empty_entries_and_duplicates() {
        let links = normalize_links(&names(&["a", "", "b", "a", ""]));
        assert_eq!(links, names(&["a", "b"]));
    }

    #[test]
    fn diff_ignores_order_and_empty_entries() {
        let old = names(&["a", "b", ""]);
        let new = names(&["", "c", "b"]);
        assert_eq!(link_diff(&old, &new), names(&["a"]));
        assert_eq!(link_diff(&new, &old), names(&["c"]));
    }
}
