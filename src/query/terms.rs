//! Term enumeration: distinct predicates between a subject and an object, and prefix
//! autocompletion within one role.

use std::collections::HashSet;

use tracing::debug;

use crate::core::literal::{to_external, to_internal};
use crate::core::{Limit, Page, Role, TermId, TermsQuery, TriplePattern, NOT_FOUND};
use crate::error::{Error, Result};
use crate::query::{search_triples, QueryContext};

fn unsupported_position() -> Error {
    Error::Unsupported("Unsupported position argument. Expected predicate.".to_string())
}

/// Distinct terms of `role` that occur in at least one triple with the given subject
/// and object. Only the predicate role is supported.
///
/// Every predicate of the dictionary is probed once, so the cost grows with the number
/// of predicates; keep `limit` small.
pub fn distinct_terms(
    ctx: &QueryContext,
    subject: &str,
    object: &str,
    limit: usize,
    role: Role,
) -> Result<Vec<String>> {
    if role != Role::Predicate {
        return Err(unsupported_position());
    }
    distinct_predicates(ctx, subject, object, limit)
}

/// Predicates occurring with `subject` and/or `object`, at most `limit` of them.
/// Empty when both are empty or either is unknown.
pub fn distinct_predicates(
    ctx: &QueryContext,
    subject: &str,
    object: &str,
    limit: usize,
) -> Result<Vec<String>> {
    if (subject.is_empty() && object.is_empty()) || limit == 0 {
        return Ok(Vec::new());
    }
    ctx.check()?;
    let index = ctx.index();

    let resolve = |term: &str, role: Role| -> Result<Option<TermId>> {
        if term.is_empty() {
            return Ok(Some(0));
        }
        let id = index.resolve_id(term, role)?;
        Ok((id != NOT_FOUND).then_some(id))
    };
    let (Some(subject_id), Some(object_id)) =
        (resolve(subject, Role::Subject)?, resolve(&to_internal(object), Role::Object)?)
    else {
        return Ok(Vec::new());
    };

    let mut found = Vec::new();
    for predicate in index.predicates()? {
        ctx.check()?;
        let predicate_id = index.resolve_id(&predicate, Role::Predicate)?;
        if predicate_id == NOT_FOUND {
            continue;
        }
        let mut probe = index.search_ids(subject_id, predicate_id, object_id)?;
        if probe.has_next()? {
            found.push(predicate);
            if found.len() >= limit {
                break;
            }
        }
    }

    debug!(subject, object, found = found.len(), "enumerated distinct predicates");
    Ok(found)
}

/// Up to `limit` terms of `role` starting with `prefix`, in dictionary order.
pub fn terms_with_prefix(
    ctx: &QueryContext,
    prefix: &str,
    role: Role,
    limit: usize,
) -> Result<Vec<String>> {
    ctx.check()?;
    let terms = ctx.index().terms_with_prefix(prefix, role, limit)?;
    Ok(match role {
        Role::Object => terms.iter().map(|term| to_external(term)).collect(),
        _ => terms,
    })
}

/// Dispatches a [`TermsQuery`]:
///
/// * subject and object given: predicates of the matching triples;
/// * one of them given: [`distinct_terms`];
/// * neither given: prefix search in `position`.
///
/// A non-empty subject or object combined with a non-predicate position is rejected.
/// Constraints that are present but empty match nothing.
pub fn search_terms(ctx: &QueryContext, query: &TermsQuery) -> Result<Vec<String>> {
    let subject = query.subject.as_deref().unwrap_or_default();
    let object = query.object.as_deref().unwrap_or_default();
    if (!subject.is_empty() || !object.is_empty()) && query.position != Role::Predicate {
        return Err(unsupported_position());
    }
    if query.subject.is_none() && query.object.is_none() {
        return terms_with_prefix(ctx, &query.prefix, query.position, query.limit);
    }
    if subject.is_empty() && object.is_empty() {
        return Ok(Vec::new());
    }

    if !subject.is_empty() && !object.is_empty() {
        let pattern = TriplePattern::new(subject, "", object);
        let result = search_triples(ctx, &pattern, Page::new(0, Limit::At(query.limit)))?;
        let mut seen = HashSet::new();
        return Ok(result
            .triples
            .into_iter()
            .map(|triple| triple.predicate)
            .filter(|predicate| seen.insert(predicate.clone()))
            .collect());
    }
    distinct_terms(ctx, subject, object, query.limit, query.position)
}
