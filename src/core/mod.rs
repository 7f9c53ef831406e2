//! Core data structures shared by the index and query layers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::MAX_PAGE_SIZE;

pub mod literal;

/// Dictionary handle of a term within one role. `0` means "not found".
pub type TermId = u64;

/// Sentinel returned by dictionary lookups for unknown terms.
pub const NOT_FOUND: TermId = 0;

/// Position of a term inside a triple. Every role has its own ID space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Subject position.
    Subject,
    /// Predicate position.
    Predicate,
    /// Object position.
    Object,
}

impl Role {
    /// Every role, in triple order.
    pub const ALL: [Role; 3] = [Role::Subject, Role::Predicate, Role::Object];

    /// Lowercase name, as used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Subject => "subject",
            Role::Predicate => "predicate",
            Role::Object => "object",
        }
    }

    /// Parses a lowercase role name.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "subject" => Some(Role::Subject),
            "predicate" => Some(Role::Predicate),
            "object" => Some(Role::Object),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string triple pattern. An empty component is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    /// Subject term.
    #[serde(default)]
    pub subject: String,
    /// Predicate term.
    #[serde(default)]
    pub predicate: String,
    /// Object term, literals in `"v"^^datatype` form.
    #[serde(default)]
    pub object: String,
}

impl TriplePattern {
    /// Builds a pattern from string terms; pass `""` for a wildcard.
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
        }
    }

    /// The pattern matching every triple.
    pub fn any() -> Self {
        Self::default()
    }
}

/// A triple pattern translated to dictionary IDs. `0` is a wildcard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedPattern {
    /// Subject ID, `0` for any.
    pub subject: TermId,
    /// Predicate ID, `0` for any.
    pub predicate: TermId,
    /// Object ID, `0` for any.
    pub object: TermId,
    /// A bound term was missing from the dictionary, so nothing can match.
    pub unsatisfiable: bool,
}

impl ResolvedPattern {
    /// A pattern that matches nothing.
    pub fn unsatisfiable() -> Self {
        Self { unsatisfiable: true, ..Self::default() }
    }

    /// Whether `triple` fits every bound component.
    pub fn matches(&self, triple: &TripleId) -> bool {
        (self.subject == 0 || self.subject == triple.subject)
            && (self.predicate == 0 || self.predicate == triple.predicate)
            && (self.object == 0 || self.object == triple.object)
    }
}

/// A triple as produced by the index, in ID form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripleId {
    /// Subject ID, `0` for any.
    pub subject: TermId,
    /// Predicate ID.
    pub predicate: TermId,
    /// Object ID.
    pub object: TermId,
}

impl TripleId {
    /// Triple from its three IDs.
    pub fn new(subject: TermId, predicate: TermId, object: TermId) -> Self {
        Self { subject, predicate, object }
    }
}

/// User-facing triple with external term strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    /// Subject term.
    pub subject: String,
    /// Predicate term.
    pub predicate: String,
    /// Object term, literals in `"v"^^datatype` form.
    pub object: String,
}

impl Triple {
    /// Triple from its three terms.
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
        }
    }
}

/// Upper bound on the number of rows in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    /// Return every row after the offset.
    Unbounded,
    /// Return at most this many rows. `At(0)` returns no rows but still counts.
    At(usize),
}

impl Limit {
    /// Whether `collected` rows already fill the page.
    pub fn is_reached(self, collected: usize) -> bool {
        match self {
            Limit::Unbounded => false,
            Limit::At(max) => collected >= max,
        }
    }

    /// Caps `At(n)` at `max`.
    pub fn clamp(self, max: usize) -> Limit {
        match self {
            Limit::Unbounded => Limit::Unbounded,
            Limit::At(n) => Limit::At(n.min(max)),
        }
    }
}

impl From<Option<usize>> for Limit {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Limit::Unbounded, Limit::At)
    }
}

/// Offset/limit window over an ordered match set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Matches to skip.
    pub offset: usize,
    /// Maximum number of rows.
    pub limit: Limit,
}

impl Page {
    /// Page starting at `offset` with at most `limit` rows.
    pub fn new(offset: usize, limit: Limit) -> Self {
        Self { offset, limit }
    }

    /// Every row, starting at the beginning.
    pub fn all() -> Self {
        Self { offset: 0, limit: Limit::Unbounded }
    }

    /// No rows; only the count is of interest.
    pub fn count_only() -> Self {
        Self { offset: 0, limit: Limit::At(0) }
    }

    /// Caps the limit at `max_rows` and the offset at [`MAX_PAGE_SIZE`]. The offset is
    /// not tied to the page size, so pages past `max_rows` stay distinct.
    pub fn clamp(self, max_rows: usize) -> Self {
        Self { offset: self.offset.min(MAX_PAGE_SIZE), limit: self.limit.clamp(max_rows) }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::all()
    }
}

/// Cardinality reported by an index iterator before it is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountEstimate {
    /// Number of matches.
    pub count: usize,
    /// Whether `count` is exact or an estimate.
    pub exact: bool,
}

impl CountEstimate {
    /// An exact count.
    pub fn exact(count: usize) -> Self {
        Self { count, exact: true }
    }

    /// An estimate.
    pub fn approximate(count: usize) -> Self {
        Self { count, exact: false }
    }
}

/// One page of triple pattern matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Matches in the requested window.
    pub triples: Vec<Triple>,
    /// Cardinality of the whole match set, before pagination.
    pub total_count: usize,
    /// Whether `total_count` is exact.
    pub has_exact_count: bool,
}

impl SearchResult {
    /// No matches, exact count of zero.
    pub fn empty() -> Self {
        Self { triples: Vec::new(), total_count: 0, has_exact_count: true }
    }
}

/// Substring search over literal terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralQuery {
    /// Text to look for inside literal values.
    pub substring: String,
    /// Window over the deduplicated matches.
    pub page: Page,
}

impl LiteralQuery {
    /// Substring query over one page.
    pub fn new(substring: &str, page: Page) -> Self {
        Self { substring: substring.to_string(), page }
    }
}

/// One page of literal search matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralResult {
    /// Matching literals in `"v"^^datatype` form.
    pub literals: Vec<String>,
    /// Number of distinct matching literals.
    pub total_count: usize,
}

/// Term lookup by role: either prefix autocompletion or the distinct terms
/// occurring next to a fixed subject and/or object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsQuery {
    /// Role of the terms to return.
    pub position: Role,
    /// Prefix for autocompletion; ignored when a subject or object is given.
    pub prefix: String,
    /// Subject the returned predicates must occur with.
    pub subject: Option<String>,
    /// Object the returned predicates must occur with.
    pub object: Option<String>,
    /// Maximum number of terms.
    pub limit: usize,
}

impl TermsQuery {
    /// Prefix autocompletion in one role.
    pub fn prefix(position: Role, prefix: &str, limit: usize) -> Self {
        Self { position, prefix: prefix.to_string(), subject: None, object: None, limit }
    }

    /// Predicates occurring with the given subject and/or object.
    pub fn between(subject: Option<&str>, object: Option<&str>, limit: usize) -> Self {
        Self {
            position: Role::Predicate,
            prefix: String::new(),
            subject: subject.map(str::to_string),
            object: object.map(str::to_string),
            limit,
        }
    }
}

/// Operations a document can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    /// Pattern search with pagination.
    pub search_triples: bool,
    /// Pattern cardinality.
    pub count_triples: bool,
    /// Substring search over literals.
    pub search_literals: bool,
    /// Term autocompletion and distinct predicates.
    pub search_terms: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("graph"), None);
    }

    #[test]
    fn test_limit_reached() {
        assert!(!Limit::Unbounded.is_reached(usize::MAX));
        assert!(Limit::At(0).is_reached(0));
        assert!(!Limit::At(2).is_reached(1));
        assert!(Limit::At(2).is_reached(2));
    }

    #[test]
    fn test_page_clamp() {
        let page = Page::new(100, Limit::At(50)).clamp(10);
        assert_eq!(page, Page::new(100, Limit::At(10)));
        assert_eq!(Page::all().clamp(10).limit, Limit::Unbounded);
        assert_eq!(Page::new(usize::MAX, Limit::At(1)).clamp(10).offset, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_resolved_pattern_matches_wildcards() {
        let pattern = ResolvedPattern { subject: 1, ..ResolvedPattern::default() };
        assert!(pattern.matches(&TripleId::new(1, 5, 9)));
        assert!(!pattern.matches(&TripleId::new(2, 5, 9)));
    }
}
