//! Query components over a [`TripleIndex`].
//!
//! # Components
//!
//! - **resolver** - string pattern to ID pattern
//! - **cursor** - offset/limit walk over the ID iterator with cardinality tracking
//! - **term_cache** - per-batch ID to string translation
//! - **literals** - substring search over literal objects
//! - **terms** - distinct predicates and prefix autocompletion
//!
//! Every function here is synchronous and runs inside one dispatched job. They take a
//! [`QueryContext`], which holds the index for the duration of the query and reports
//! a close of the owning document.

use std::sync::Arc;

use crate::core::{Page, SearchResult, TriplePattern};
use crate::error::Result;
use crate::index::{IndexHandle, TripleIndex};

pub mod cursor;
pub mod literals;
pub mod resolver;
pub mod term_cache;
pub mod terms;

pub use cursor::{collect_page, IdPage};
pub use literals::search_literals;
pub use resolver::resolve_pattern;
pub use term_cache::TermCache;
pub use terms::{distinct_predicates, distinct_terms, search_terms, terms_with_prefix};

/// The index a running query works on, plus the handle it came from.
pub struct QueryContext {
    index: Arc<dyn TripleIndex>,
    handle: IndexHandle,
}

impl QueryContext {
    /// Takes the index out of `handle`; fails if it is closed.
    pub fn acquire(handle: &IndexHandle) -> Result<Self> {
        Ok(QueryContext { index: handle.acquire()?, handle: handle.clone() })
    }

    /// The index this query runs on.
    pub fn index(&self) -> &dyn TripleIndex {
        self.index.as_ref()
    }

    /// Fails with `Error::Closed` once the owning document has been closed.
    pub fn check(&self) -> Result<()> {
        self.handle.ensure_open()
    }
}

/// Resolves `pattern`, collects one page of matches and translates it to strings.
pub fn search_triples(ctx: &QueryContext, pattern: &TriplePattern, page: Page) -> Result<SearchResult> {
    let resolved = resolve_pattern(ctx.index(), pattern)?;
    let ids = collect_page(ctx, &resolved, page)?;

    let mut cache = TermCache::new(ctx.index());
    let triples = cache.translate_all(&ids.triples)?;
    Ok(SearchResult {
        triples,
        total_count: ids.total_count,
        has_exact_count: ids.has_exact_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Limit, Triple};
    use crate::index::MemoryIndex;

    fn context() -> QueryContext {
        let mut builder = MemoryIndex::builder();
        builder
            .add("ex:a", "ex:knows", "ex:b")
            .add("ex:a", "ex:knows", "ex:c")
            .add("ex:a", "ex:likes", "ex:b");
        QueryContext::acquire(&IndexHandle::new(Arc::new(builder.build()))).unwrap()
    }

    #[test]
    fn test_search_subject_predicate() {
        let ctx = context();
        let result = search_triples(
            &ctx,
            &TriplePattern::new("ex:a", "ex:knows", ""),
            Page::new(0, Limit::At(10)),
        )
        .unwrap();
        assert_eq!(
            result.triples,
            vec![Triple::new("ex:a", "ex:knows", "ex:b"), Triple::new("ex:a", "ex:knows", "ex:c")]
        );
        assert_eq!(result.total_count, 2);
        assert!(result.has_exact_count);
    }

    #[test]
    fn test_search_second_match_only() {
        let ctx = context();
        let result = search_triples(
            &ctx,
            &TriplePattern::new("ex:a", "ex:knows", ""),
            Page::new(1, Limit::At(1)),
        )
        .unwrap();
        assert_eq!(result.triples, vec![Triple::new("ex:a", "ex:knows", "ex:c")]);
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn test_search_unknown_subject() {
        let ctx = context();
        let result =
            search_triples(&ctx, &TriplePattern::new("ex:nobody", "", ""), Page::all()).unwrap();
        assert_eq!(result, SearchResult::empty());
    }
}
