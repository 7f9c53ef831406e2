//! ID to string translation for one result batch.

use std::collections::HashMap;

use crate::core::literal::to_external;
use crate::core::{Role, TermId, Triple, TripleId};
use crate::error::Result;
use crate::index::TripleIndex;

/// Per-batch ID to string memo, one map per role. Lives for a single result batch.
pub struct TermCache<'a> {
    index: &'a dyn TripleIndex,
    subjects: HashMap<TermId, String>,
    predicates: HashMap<TermId, String>,
    objects: HashMap<TermId, String>,
    lookups: usize,
}

impl<'a> TermCache<'a> {
    /// Empty cache over `index`.
    pub fn new(index: &'a dyn TripleIndex) -> Self {
        TermCache {
            index,
            subjects: HashMap::new(),
            predicates: HashMap::new(),
            objects: HashMap::new(),
            lookups: 0,
        }
    }

    /// External string of `id`. Objects are converted to caller literal syntax.
    pub fn term(&mut self, id: TermId, role: Role) -> Result<String> {
        let map = match role {
            Role::Subject => &mut self.subjects,
            Role::Predicate => &mut self.predicates,
            Role::Object => &mut self.objects,
        };
        if let Some(term) = map.get(&id) {
            return Ok(term.clone());
        }

        let stored = self.index.id_to_string(id, role)?;
        let term = if role == Role::Object { to_external(&stored) } else { stored };
        self.lookups += 1;
        map.insert(id, term.clone());
        Ok(term)
    }

    /// Translates one ID triple to strings.
    pub fn translate(&mut self, triple: &TripleId) -> Result<Triple> {
        Ok(Triple {
            subject: self.term(triple.subject, Role::Subject)?,
            predicate: self.term(triple.predicate, Role::Predicate)?,
            object: self.term(triple.object, Role::Object)?,
        })
    }

    /// Translates a batch, reusing lookups across it.
    pub fn translate_all(&mut self, triples: &[TripleId]) -> Result<Vec<Triple>> {
        triples.iter().map(|triple| self.translate(triple)).collect()
    }

    /// Dictionary lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    #[test]
    fn test_repeated_ids_looked_up_once() {
        let mut builder = MemoryIndex::builder();
        builder
            .add("ex:a", "ex:knows", "ex:b")
            .add("ex:a", "ex:knows", "ex:c")
            .add("ex:a", "ex:likes", "ex:b");
        let index = builder.build();

        let ids: Vec<TripleId> = {
            let mut it = index.search_ids(0, 0, 0).unwrap();
            std::iter::from_fn(|| it.next_triple().unwrap()).collect()
        };
        let mut cache = TermCache::new(&index);
        let triples = cache.translate_all(&ids).unwrap();

        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0], Triple::new("ex:a", "ex:knows", "ex:b"));
        // 1 subject + 2 predicates + 2 objects
        assert_eq!(cache.lookups(), 5);
    }

    #[test]
    fn test_objects_use_external_syntax() {
        let mut builder = MemoryIndex::builder();
        builder.add("ex:a", "ex:age", "\"5\"^^http://www.w3.org/2001/XMLSchema#integer");
        let index = builder.build();

        let mut cache = TermCache::new(&index);
        let object = cache.term(1, Role::Object).unwrap();
        assert_eq!(object, "\"5\"^^http://www.w3.org/2001/XMLSchema#integer");
    }
}
