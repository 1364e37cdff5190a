//! Company-name search over the registry.
//!
//! Matching ignores whitespace and case. Results come in two buckets: exact
//! name matches first, then every other name containing the query. A short
//! query such as a group's root name therefore surfaces the parent company
//! at the top while still listing every affiliate that carries the name.

use crate::registry::RegistryEntry;
use std::cmp::Ordering;

/// Maximum number of hits returned by [`search`]
pub const MAX_RESULTS: usize = 200;

/// How a registry name matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchRank {
    /// Name equals the query, ignoring whitespace and case
    Exact = 0,
    /// Name contains the query, ignoring whitespace and case
    Partial = 1,
}

/// A registry entry matched by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// The matched entry
    pub entry: RegistryEntry,
    /// Match quality
    pub rank: MatchRank,
    /// Whether the corporation has an exchange listing
    pub listed: bool,
}

impl SearchHit {
    fn new(entry: &RegistryEntry, rank: MatchRank) -> Self {
        Self {
            listed: entry.is_listed(),
            entry: entry.clone(),
            rank,
        }
    }

    /// Result ordering: rank, then listed before unlisted, then name.
    fn order(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| other.listed.cmp(&self.listed))
            .then_with(|| self.entry.corp_name.cmp(&other.entry.corp_name))
    }
}

/// Strip all whitespace and fold case.
/// Whitespace removed and lowercased, with `ß` folded to `ss` so it
/// matches its uppercase spelling.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .replace('ß', "ss")
}

/// Search the registry by company name.
///
/// Returns at most [`MAX_RESULTS`] hits ordered by rank, then listed
/// corporations first, then name. A blank query returns nothing.
///
/// # Example
/// ```
/// use dartdl_data::registry::RegistryEntry;
/// use dartdl_data::search::{MatchRank, search};
///
/// let registry = vec![
///     RegistryEntry::new("2", "Samsung Life", ""),
///     RegistryEntry::new("1", "Samsung Electronics", "005930"),
///     RegistryEntry::new("0", "Samsung", "000830"),
/// ];
/// let hits = search(&registry, "samsung");
/// assert_eq!(hits[0].entry.corp_name, "Samsung");
/// assert_eq!(hits[0].rank, MatchRank::Exact);
/// ```
pub fn search(registry: &[RegistryEntry], query: &str) -> Vec<SearchHit> {
    let query = normalize(query.trim());
    if query.is_empty() {
        return Vec::new();
    }

    let mut exact = Vec::new();
    let mut partial = Vec::new();
    for entry in registry {
        let name = normalize(&entry.corp_name);
        if name == query {
            exact.push(SearchHit::new(entry, MatchRank::Exact));
        } else if name.contains(&query) {
            partial.push(SearchHit::new(entry, MatchRank::Partial));
        }
    }

    let mut hits = exact;
    hits.append(&mut partial);
    hits.sort_by(SearchHit::order);
    hits.truncate(MAX_RESULTS);
    hits
}
