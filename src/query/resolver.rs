//! Translation of string patterns to dictionary IDs.

use crate::core::literal::to_internal;
use crate::core::{ResolvedPattern, Role, TermId, TriplePattern, NOT_FOUND};
use crate::error::Result;
use crate::index::TripleIndex;

/// Translates a string pattern into dictionary IDs.
///
/// The object is normalized to stored literal syntax first. A non-empty term that is
/// missing from its role's dictionary makes the pattern unsatisfiable; lookups stop at
/// the first such term.
pub fn resolve_pattern(index: &dyn TripleIndex, pattern: &TriplePattern) -> Result<ResolvedPattern> {
    let object = to_internal(&pattern.object);
    let terms = [
        (pattern.subject.as_str(), Role::Subject),
        (pattern.predicate.as_str(), Role::Predicate),
        (object.as_str(), Role::Object),
    ];

    let mut ids: [TermId; 3] = [0; 3];
    for (slot, (term, role)) in ids.iter_mut().zip(terms) {
        if term.is_empty() {
            continue;
        }
        let id = index.resolve_id(term, role)?;
        if id == NOT_FOUND {
            return Ok(ResolvedPattern::unsatisfiable());
        }
        *slot = id;
    }

    Ok(ResolvedPattern { subject: ids[0], predicate: ids[1], object: ids[2], unsatisfiable: false })
}
