//! Triple index interface and the in-memory implementation.
//!
//! The query layer only talks to [`TripleIndex`]: dictionary lookups per role, an
//! ID-pattern iterator that can report its cardinality and optionally seek, literal
//! substring search and predicate enumeration. [`memory::MemoryIndex`] implements it
//! over sorted ID triples and sorted per-role dictionaries.

use crate::core::{CountEstimate, Limit, Role, TermId, TripleId};
use crate::error::{Error, Result};

pub mod dictionary;
pub mod handle;
pub mod memory;

pub use handle::IndexHandle;
pub use memory::{MemoryIndex, MemoryIndexBuilder};

/// Capability flags of an index implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexFeatures {
    /// The dictionary can look up literals by substring.
    pub literal_search: bool,
}

/// Iterator over the ID triples matching one pattern.
///
/// The iterator is an owned resource; dropping it releases whatever it holds.
pub trait TripleIdIter: Send {
    /// Whether another match is left.
    fn has_next(&mut self) -> Result<bool>;

    /// Next match, `None` at the end.
    fn next_triple(&mut self) -> Result<Option<TripleId>>;

    /// Cardinality of the whole match set, available before iteration starts.
    fn estimated_count(&self) -> CountEstimate;

    /// Whether [`TripleIdIter::seek`] is supported.
    fn can_seek(&self) -> bool {
        false
    }

    /// Positions the iterator so the next triple is the `n`-th match (0-based).
    /// Seeking past the end fails with [`Error::SeekOutOfRange`].
    fn seek(&mut self, n: usize) -> Result<()> {
        Err(Error::Unsupported(format!("seek to {n} on a sequential iterator")))
    }
}

/// Read-only, ID-encoded triple store the query layer runs against.
pub trait TripleIndex: Send + Sync {
    /// Capabilities of this index.
    fn features(&self) -> IndexFeatures;

    /// ID of `term` in the given role, `0` if absent.
    fn resolve_id(&self, term: &str, role: Role) -> Result<TermId>;

    /// Term with the given ID in `role`.
    fn id_to_string(&self, id: TermId, role: Role) -> Result<String>;

    /// Iterates the triples matching the ID pattern; `0` components are wildcards.
    fn search_ids(
        &self,
        subject: TermId,
        predicate: TermId,
        object: TermId,
    ) -> Result<Box<dyn TripleIdIter + '_>>;

    /// Object IDs of literals containing `text`, paginated by the index, together with
    /// the number of candidates before pagination. Candidates may repeat.
    fn substring_search(
        &self,
        text: &str,
        offset: usize,
        limit: Limit,
    ) -> Result<(Vec<TermId>, usize)> {
        let _ = (text, offset, limit);
        Err(Error::Unsupported("literal substring search".to_string()))
    }

    /// Every predicate of the dictionary, in dictionary order.
    fn predicates(&self) -> Result<Box<dyn Iterator<Item = String> + '_>>;

    /// Up to `limit` terms of `role` starting with `prefix`, in dictionary order and in
    /// stored syntax.
    fn terms_with_prefix(&self, prefix: &str, role: Role, limit: usize) -> Result<Vec<String>>;
}
