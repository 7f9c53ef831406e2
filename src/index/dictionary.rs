//! Per-role term dictionaries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::literal::{self, to_internal};
use crate::core::{Role, TermId, NOT_FOUND};

/// Sorted term section for one role. IDs are 1-based positions in lexicographic order,
/// so ID order and string order agree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleDictionary {
    terms: Vec<String>,
}

impl RoleDictionary {
    /// Section holding `terms`, in their sorted order.
    pub fn from_terms(terms: BTreeSet<String>) -> Self {
        RoleDictionary { terms: terms.into_iter().collect() }
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the section has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// ID of `term`, or `NOT_FOUND`.
    pub fn string_to_id(&self, term: &str) -> TermId {
        match self.terms.binary_search_by(|probe| probe.as_str().cmp(term)) {
            Ok(pos) => pos as TermId + 1,
            Err(_) => NOT_FOUND,
        }
    }

    /// Term with the given ID.
    pub fn id_to_string(&self, id: TermId) -> Option<&str> {
        if id == NOT_FOUND {
            return None;
        }
        self.terms.get((id - 1) as usize).map(String::as_str)
    }

    /// IDs of all terms starting with `prefix`, in dictionary order.
    pub fn prefix_ids(&self, prefix: &str) -> impl Iterator<Item = TermId> + '_ {
        let start = self.terms.partition_point(|term| term.as_str() < prefix);
        let owned = prefix.to_string();
        self.terms[start..]
            .iter()
            .take_while(move |term| term.starts_with(owned.as_str()))
            .enumerate()
            .map(move |(i, _)| (start + i) as TermId + 1)
    }

    /// `(id, term)` pairs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &str)> + '_ {
        self.terms.iter().enumerate().map(|(i, term)| (i as TermId + 1, term.as_str()))
    }
}

/// Per-role dictionaries. The same string may appear in several sections with
/// unrelated IDs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionary {
    /// Subject section.
    pub subjects: RoleDictionary,
    /// Predicate section.
    pub predicates: RoleDictionary,
    /// Object section; literals in stored syntax.
    pub objects: RoleDictionary,
}

impl Dictionary {
    /// Section of `role`.
    pub fn section(&self, role: Role) -> &RoleDictionary {
        match role {
            Role::Subject => &self.subjects,
            Role::Predicate => &self.predicates,
            Role::Object => &self.objects,
        }
    }

    /// ID of `term` in `role`, or `NOT_FOUND`.
    pub fn string_to_id(&self, term: &str, role: Role) -> TermId {
        self.section(role).string_to_id(term)
    }

    /// Term with the given ID in `role`.
    pub fn id_to_string(&self, id: TermId, role: Role) -> Option<&str> {
        self.section(role).id_to_string(id)
    }

    /// Object IDs of every literal whose lexical value contains `text`.
    pub fn literal_ids_containing<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = TermId> + 'a {
        self.objects.iter().filter_map(move |(id, term)| {
            literal::lexical_value(term).filter(|value| value.contains(text)).map(|_| id)
        })
    }

    /// Approximate heap size of all terms.
    pub fn size_in_bytes(&self) -> usize {
        Role::ALL
            .iter()
            .flat_map(|role| self.section(*role).terms.iter())
            .map(|term| term.len() + std::mem::size_of::<String>())
            .sum()
    }
}

/// Collects the distinct terms of each role before IDs are assigned.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    subjects: BTreeSet<String>,
    predicates: BTreeSet<String>,
    objects: BTreeSet<String>,
}

impl DictionaryBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the terms of one triple. Objects are stored in internal literal syntax.
    pub fn insert(&mut self, subject: &str, predicate: &str, object: &str) {
        self.subjects.insert(subject.to_string());
        self.predicates.insert(predicate.to_string());
        self.objects.insert(to_internal(object));
    }

    /// Sorts every section and assigns IDs.
    pub fn build(self) -> Dictionary {
        Dictionary {
            subjects: RoleDictionary::from_terms(self.subjects),
            predicates: RoleDictionary::from_terms(self.predicates),
            objects: RoleDictionary::from_terms(self.objects),
        }
    }
}
