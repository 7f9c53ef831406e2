//! Substring search over literal objects.

use std::collections::HashSet;

use tracing::debug;

use crate::core::literal::to_external;
use crate::core::{Limit, LiteralQuery, LiteralResult, Role, TermId};
use crate::error::{Error, Result};
use crate::query::QueryContext;

/// Finds the literals whose value contains `query.substring`.
///
/// Candidate IDs are deduplicated in first-seen order before the page is cut, so
/// `total_count` is the number of distinct matching literals and pages never overlap.
pub fn search_literals(ctx: &QueryContext, query: &LiteralQuery) -> Result<LiteralResult> {
    let index = ctx.index();
    if !index.features().literal_search {
        return Err(Error::Unsupported(
            "The document does not support literal search".to_string(),
        ));
    }
    ctx.check()?;

    let (candidates, _) = index.substring_search(&query.substring, 0, Limit::Unbounded)?;
    let mut seen = HashSet::with_capacity(candidates.len());
    let unique: Vec<TermId> = candidates.into_iter().filter(|id| seen.insert(*id)).collect();
    let total_count = unique.len();

    let take = match query.page.limit {
        Limit::Unbounded => usize::MAX,
        Limit::At(n) => n,
    };
    let mut literals = Vec::new();
    for id in unique.into_iter().skip(query.page.offset).take(take) {
        ctx.check()?;
        literals.push(to_external(&index.id_to_string(id, Role::Object)?));
    }

    debug!(substring = %query.substring, rows = literals.len(), total_count, "searched literals");
    Ok(LiteralResult { literals, total_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Page;
    use crate::index::{IndexFeatures, IndexHandle, MemoryIndex, TripleIdIter, TripleIndex};
    use std::sync::Arc;

    fn context(index: impl TripleIndex + 'static) -> QueryContext {
        QueryContext::acquire(&IndexHandle::new(Arc::new(index))).unwrap()
    }

    fn store() -> MemoryIndex {
        let mut builder = MemoryIndex::builder();
        builder
            .add("ex:a", "ex:name", "\"Alice\"")
            .add("ex:b", "ex:name", "\"Alicia\"@es")
            .add("ex:c", "ex:name", "\"Bob\"")
            .add("ex:c", "ex:age", "\"41\"^^http://www.w3.org/2001/XMLSchema#integer")
            .add("ex:d", "ex:age", "\"14\"^^http://www.w3.org/2001/XMLSchema#integer");
        builder.build()
    }

    #[test]
    fn test_substring_matches() {
        let ctx = context(store());
        let result = search_literals(&ctx, &LiteralQuery::new("Ali", Page::all())).unwrap();
        assert_eq!(result.total_count, 2);
        assert_eq!(result.literals, vec!["\"Alice\"", "\"Alicia\"@es"]);
    }

    #[test]
    fn test_typed_literals_returned_externally() {
        let ctx = context(store());
        let result = search_literals(&ctx, &LiteralQuery::new("4", Page::all())).unwrap();
        assert_eq!(result.total_count, 2);
        assert!(result
            .literals
            .contains(&"\"41\"^^http://www.w3.org/2001/XMLSchema#integer".to_string()));
    }

    #[test]
    fn test_pagination() {
        let ctx = context(store());
        let first = search_literals(&ctx, &LiteralQuery::new("", Page::new(0, Limit::At(2)))).unwrap();
        let rest = search_literals(&ctx, &LiteralQuery::new("", Page::new(2, Limit::Unbounded))).unwrap();
        assert_eq!(first.total_count, 5);
        assert_eq!(first.literals.len(), 2);
        assert_eq!(rest.literals.len(), 3);
        assert!(first.literals.iter().all(|l| !rest.literals.contains(l)));
    }

    #[test]
    fn test_unsupported_index() {
        let mut builder = MemoryIndex::builder().literal_search(false);
        builder.add("ex:a", "ex:name", "\"Alice\"");
        let ctx = context(builder.build());
        let err = search_literals(&ctx, &LiteralQuery::new("A", Page::all())).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    /// Index whose literal lookup reports the same IDs from two partitions.
    struct Partitioned;

    impl TripleIndex for Partitioned {
        fn features(&self) -> IndexFeatures {
            IndexFeatures { literal_search: true }
        }

        fn resolve_id(&self, _: &str, _: Role) -> Result<TermId> {
            Ok(0)
        }

        fn id_to_string(&self, id: TermId, _: Role) -> Result<String> {
            Ok(format!("\"lit{id}\""))
        }

        fn search_ids(&self, _: TermId, _: TermId, _: TermId) -> Result<Box<dyn TripleIdIter + '_>> {
            Err(Error::Index("no triples".to_string()))
        }

        fn substring_search(&self, _: &str, _: usize, _: Limit) -> Result<(Vec<TermId>, usize)> {
            Ok((vec![3, 1, 3, 2, 1], 5))
        }

        fn predicates(&self) -> Result<Box<dyn Iterator<Item = String> + '_>> {
            Ok(Box::new(std::iter::empty()))
        }

        fn terms_with_prefix(&self, _: &str, _: Role, _: usize) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_duplicate_candidates_collapsed() {
        let ctx = context(Partitioned);
        let result = search_literals(&ctx, &LiteralQuery::new("lit", Page::all())).unwrap();
        assert_eq!(result.total_count, 3);
        assert_eq!(result.literals, vec!["\"lit3\"", "\"lit1\"", "\"lit2\""]);

        let again = search_literals(&ctx, &LiteralQuery::new("lit", Page::all())).unwrap();
        assert_eq!(again, result);
    }
}
