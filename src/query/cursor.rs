//! Paginated walk over an ID iterator.

use tracing::debug;

use crate::core::{Page, ResolvedPattern, TripleId};
use crate::error::{Error, Result};
use crate::query::QueryContext;

/// One page of ID triples with the cardinality of the whole match set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPage {
    /// Matches in the requested window.
    pub triples: Vec<TripleId>,
    /// Cardinality of the whole match set.
    pub total_count: usize,
    /// Whether `total_count` is exact.
    pub has_exact_count: bool,
}

impl IdPage {
    fn empty() -> Self {
        IdPage { triples: Vec::new(), total_count: 0, has_exact_count: true }
    }
}

/// Walks the ID iterator of `pattern`, skipping `page.offset` matches and collecting up
/// to `page.limit`.
///
/// The count comes from the iterator before anything is consumed. When the iterator
/// could not seek and the walk reached its end, the number of matches stepped over is
/// the real cardinality and replaces an inexact estimate.
pub fn collect_page(ctx: &QueryContext, pattern: &ResolvedPattern, page: Page) -> Result<IdPage> {
    if pattern.unsatisfiable {
        return Ok(IdPage::empty());
    }
    ctx.check()?;

    let index = ctx.index();
    let mut it = index.search_ids(pattern.subject, pattern.predicate, pattern.object)?;
    let estimate = it.estimated_count();

    // `stepped` counts matches consumed from the very start; it is the cardinality only
    // while no seek happened.
    let mut stepped = 0usize;
    let mut sequential = true;
    let mut exhausted = false;
    // length reported by a seek that ran past the end
    let mut seek_len = None;

    if page.offset > 0 {
        if it.can_seek() {
            sequential = false;
            match it.seek(page.offset) {
                Ok(()) => {}
                Err(Error::SeekOutOfRange { offset, len }) => {
                    debug!(offset, len, "offset beyond match set");
                    exhausted = true;
                    seek_len = Some(len);
                }
                Err(e) => return Err(e),
            }
        } else {
            while stepped < page.offset {
                ctx.check()?;
                if it.next_triple()?.is_none() {
                    exhausted = true;
                    break;
                }
                stepped += 1;
            }
        }
    }

    let mut triples = Vec::new();
    if !exhausted {
        while !page.limit.is_reached(triples.len()) {
            ctx.check()?;
            match it.next_triple()? {
                Some(triple) => triples.push(triple),
                None => {
                    exhausted = true;
                    break;
                }
            }
        }
        if !exhausted && sequential && !estimate.exact {
            exhausted = !it.has_next()?;
        }
    }
    drop(it);

    let (total_count, has_exact_count) = if estimate.exact {
        (estimate.count, true)
    } else if let Some(len) = seek_len {
        (len, true)
    } else if sequential && exhausted {
        (stepped + triples.len(), true)
    } else {
        let seen = if sequential { stepped } else { page.offset };
        (estimate.count.max(seen + triples.len()), false)
    };

    debug!(
        offset = page.offset,
        rows = triples.len(),
        total_count,
        has_exact_count,
        "collected page"
    );
    Ok(IdPage { triples, total_count, has_exact_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CountEstimate, Limit, Role, TermId};
    use crate::index::{IndexFeatures, IndexHandle, MemoryIndex, TripleIdIter, TripleIndex};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn context(index: impl TripleIndex + 'static) -> QueryContext {
        QueryContext::acquire(&IndexHandle::new(Arc::new(index))).unwrap()
    }

    fn store() -> MemoryIndex {
        let mut builder = MemoryIndex::builder();
        for i in 0..10 {
            builder.add("ex:s", "ex:p", &format!("ex:o{i}"));
            builder.add(&format!("ex:t{i}"), "ex:q", "ex:o0");
        }
        builder.build()
    }

    fn objects(ctx: &QueryContext, page: &IdPage) -> Vec<String> {
        page.triples
            .iter()
            .map(|t| ctx.index().id_to_string(t.object, Role::Object).unwrap())
            .collect()
    }

    #[test]
    fn test_unsatisfiable_is_empty_and_exact() {
        let ctx = context(store());
        let page = collect_page(&ctx, &ResolvedPattern::unsatisfiable(), Page::all()).unwrap();
        assert_eq!(page, IdPage { triples: vec![], total_count: 0, has_exact_count: true });
    }

    #[test]
    fn test_seekable_offset_and_limit() {
        let ctx = context(store());
        let s = ctx.index().resolve_id("ex:s", Role::Subject).unwrap();
        let pattern = ResolvedPattern { subject: s, ..ResolvedPattern::default() };

        let page = collect_page(&ctx, &pattern, Page::new(3, Limit::At(2))).unwrap();
        assert_eq!(objects(&ctx, &page), vec!["ex:o3", "ex:o4"]);
        assert_eq!(page.total_count, 10);
        assert!(page.has_exact_count);
    }

    #[test]
    fn test_offset_past_end_is_not_an_error() {
        let ctx = context(store());
        let s = ctx.index().resolve_id("ex:s", Role::Subject).unwrap();
        let pattern = ResolvedPattern { subject: s, ..ResolvedPattern::default() };

        let page = collect_page(&ctx, &pattern, Page::new(50, Limit::At(5))).unwrap();
        assert!(page.triples.is_empty());
        assert_eq!(page.total_count, 10);
    }

    #[test]
    fn test_zero_limit_counts_only() {
        let ctx = context(store());
        let page = collect_page(&ctx, &ResolvedPattern::default(), Page::count_only()).unwrap();
        assert!(page.triples.is_empty());
        assert_eq!(page.total_count, 20);
        assert!(page.has_exact_count);
    }

    #[test]
    fn test_sequential_walk_makes_count_exact() {
        let ctx = context(store());
        let o0 = ctx.index().resolve_id("ex:o0", Role::Object).unwrap();
        let s = ctx.index().resolve_id("ex:s", Role::Subject).unwrap();
        // S?O is not a prefix of SPO order, so the index filters and estimates
        let pattern = ResolvedPattern { subject: s, object: o0, ..ResolvedPattern::default() };

        let page = collect_page(&ctx, &pattern, Page::all()).unwrap();
        assert_eq!(page.triples.len(), 1);
        assert_eq!(page.total_count, 1);
        assert!(page.has_exact_count);
    }

    /// Sequential iterator over a fixed list with a deliberately low estimate.
    struct Scripted {
        items: Vec<TripleId>,
        pos: usize,
        estimate: CountEstimate,
        fail_at: Option<usize>,
        seekable: bool,
    }

    impl TripleIdIter for Scripted {
        fn has_next(&mut self) -> Result<bool> {
            Ok(self.pos < self.items.len())
        }

        fn next_triple(&mut self) -> Result<Option<TripleId>> {
            if self.fail_at == Some(self.pos) {
                return Err(Error::Index("corrupted block".to_string()));
            }
            let next = self.items.get(self.pos).copied();
            self.pos += 1;
            Ok(next)
        }

        fn estimated_count(&self) -> CountEstimate {
            self.estimate
        }

        fn can_seek(&self) -> bool {
            self.seekable
        }

        fn seek(&mut self, n: usize) -> Result<()> {
            if n >= self.items.len() {
                return Err(Error::SeekOutOfRange { offset: n, len: self.items.len() });
            }
            self.pos = n;
            Ok(())
        }
    }

    struct ScriptedIndex {
        len: usize,
        estimate: CountEstimate,
        fail_at: Option<usize>,
        seekable: bool,
        opened: AtomicUsize,
    }

    impl TripleIndex for ScriptedIndex {
        fn features(&self) -> IndexFeatures {
            IndexFeatures::default()
        }

        fn resolve_id(&self, _term: &str, _role: Role) -> Result<TermId> {
            Ok(1)
        }

        fn id_to_string(&self, id: TermId, _role: Role) -> Result<String> {
            Ok(format!("ex:{id}"))
        }

        fn search_ids(&self, _: TermId, _: TermId, _: TermId) -> Result<Box<dyn TripleIdIter + '_>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let items = (1..=self.len as TermId).map(|i| TripleId::new(i, 1, 1)).collect();
            Ok(Box::new(Scripted {
                items,
                pos: 0,
                estimate: self.estimate,
                fail_at: self.fail_at,
                seekable: self.seekable,
            }))
        }

        fn predicates(&self) -> Result<Box<dyn Iterator<Item = String> + '_>> {
            Ok(Box::new(std::iter::empty()))
        }

        fn terms_with_prefix(&self, _: &str, _: Role, _: usize) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn scripted(len: usize, estimate: CountEstimate, fail_at: Option<usize>) -> ScriptedIndex {
        ScriptedIndex { len, estimate, fail_at, seekable: false, opened: AtomicUsize::new(0) }
    }

    #[test]
    fn test_linear_skip_without_seek() {
        let ctx = context(scripted(6, CountEstimate::exact(6), None));
        let page = collect_page(&ctx, &ResolvedPattern::default(), Page::new(4, Limit::At(5))).unwrap();
        let subjects: Vec<_> = page.triples.iter().map(|t| t.subject).collect();
        assert_eq!(subjects, vec![5, 6]);
        assert_eq!(page.total_count, 6);
    }

    #[test]
    fn test_estimate_never_below_rows_seen() {
        let ctx = context(scripted(8, CountEstimate::approximate(2), None));
        let page = collect_page(&ctx, &ResolvedPattern::default(), Page::new(1, Limit::At(3))).unwrap();
        assert_eq!(page.triples.len(), 3);
        assert!(!page.has_exact_count);
        assert!(page.total_count >= 4);
    }

    #[test]
    fn test_estimate_replaced_when_exhausted() {
        let ctx = context(scripted(5, CountEstimate::approximate(40), None));
        let page = collect_page(&ctx, &ResolvedPattern::default(), Page::new(2, Limit::At(10))).unwrap();
        assert_eq!(page.triples.len(), 3);
        assert_eq!(page.total_count, 5);
        assert!(page.has_exact_count);
    }

    #[test]
    fn test_seek_past_end_fixes_inexact_count() {
        let index = ScriptedIndex { seekable: true, ..scripted(4, CountEstimate::approximate(40), None) };
        let ctx = context(index);
        let page = collect_page(&ctx, &ResolvedPattern::default(), Page::new(10, Limit::At(5))).unwrap();
        assert!(page.triples.is_empty());
        assert_eq!(page.total_count, 4);
        assert!(page.has_exact_count);
    }

    #[test]
    fn test_seek_within_range_keeps_estimate() {
        let index = ScriptedIndex { seekable: true, ..scripted(6, CountEstimate::approximate(3), None) };
        let ctx = context(index);
        let page = collect_page(&ctx, &ResolvedPattern::default(), Page::new(2, Limit::At(2))).unwrap();
        let subjects: Vec<_> = page.triples.iter().map(|t| t.subject).collect();
        assert_eq!(subjects, vec![3, 4]);
        assert!(!page.has_exact_count);
        assert_eq!(page.total_count, 4);
    }

    #[test]
    fn test_unsatisfiable_skips_the_index() {
        let index = Arc::new(scripted(3, CountEstimate::exact(3), None));
        let ctx = QueryContext::acquire(&IndexHandle::new(index.clone())).unwrap();
        collect_page(&ctx, &ResolvedPattern::unsatisfiable(), Page::all()).unwrap();
        assert_eq!(index.opened.load(Ordering::SeqCst), 0);

        collect_page(&ctx, &ResolvedPattern::default(), Page::all()).unwrap();
        assert_eq!(index.opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_iteration_error_aborts() {
        let ctx = context(scripted(5, CountEstimate::exact(5), Some(3)));
        let result = collect_page(&ctx, &ResolvedPattern::default(), Page::all());
        assert!(matches!(result, Err(Error::Index(_))));
    }

    #[test]
    fn test_closed_handle_aborts() {
        let handle = IndexHandle::new(Arc::new(store()));
        let ctx = QueryContext::acquire(&handle).unwrap();
        handle.close().unwrap();
        let result = collect_page(&ctx, &ResolvedPattern::default(), Page::all());
        assert!(matches!(result, Err(Error::Closed)));
    }
}
