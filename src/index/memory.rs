//! In-memory triple index.
//!
//! Triples are kept as ID triples sorted in subject-predicate-object order. A pattern
//! whose bound components form a prefix of that order (`S??`, `SP?`, `SPO`, `???`) is a
//! contiguous range: its count is exact and the iterator can seek. Other patterns scan
//! the range of their bound prefix and filter, reporting an estimate.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::literal::to_internal;
use crate::core::{CountEstimate, Limit, ResolvedPattern, Role, TermId, TripleId};
use crate::error::{Error, Result};
use crate::index::dictionary::{Dictionary, DictionaryBuilder};
use crate::index::{IndexFeatures, TripleIdIter, TripleIndex};

const SNAPSHOT_MAGIC: &[u8; 8] = b"HDTQIDX1";

/// Dictionary plus SPO-sorted ID triples, held in memory and persisted with bincode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryIndex {
    dictionary: Dictionary,
    /// Sorted, deduplicated.
    triples: Vec<TripleId>,
    /// Occurrences per predicate ID (slot 0 unused).
    predicate_counts: Vec<usize>,
    /// Occurrences per object ID (slot 0 unused).
    object_counts: Vec<usize>,
    literal_search: bool,
}

impl MemoryIndex {
    /// Starts an empty builder.
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::new()
    }

    /// The per-role dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Number of distinct triples.
    pub fn triple_count(&self) -> usize {
        self.triples.len()
    }

    /// Approximate heap size of terms and triples.
    pub fn size_in_bytes(&self) -> usize {
        self.dictionary.size_in_bytes() + self.triples.len() * std::mem::size_of::<TripleId>()
    }

    /// Writes a snapshot: magic header followed by the bincode encoding.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(SNAPSHOT_MAGIC)?;
        bincode::serialize_into(&mut file, self)?;
        file.flush()?;
        info!(path = %path.display(), triples = self.triples.len(), "saved index snapshot");
        Ok(())
    }

    /// Reads a snapshot written by [`MemoryIndex::save_to_file`] and checks it.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|_| Error::CouldNotOpen { path: display.clone() })?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 8];
        if reader.read_exact(&mut magic).is_err() || &magic != SNAPSHOT_MAGIC {
            return Err(Error::InvalidFile {
                path: display,
                reason: "missing snapshot header".to_string(),
            });
        }

        let index: MemoryIndex = bincode::deserialize_from(&mut reader)
            .map_err(|e| Error::InvalidFile { path: display.clone(), reason: e.to_string() })?;
        index
            .check_consistency()
            .map_err(|reason| Error::InvalidFile { path: display.clone(), reason })?;

        info!(path = %path.display(), triples = index.triples.len(), "loaded index snapshot");
        Ok(index)
    }

    fn check_consistency(&self) -> std::result::Result<(), String> {
        if !self.triples.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err("triples are not sorted".to_string());
        }
        let sizes = (
            self.dictionary.subjects.len() as TermId,
            self.dictionary.predicates.len() as TermId,
            self.dictionary.objects.len() as TermId,
        );
        let in_range = |id: TermId, max: TermId| id >= 1 && id <= max;
        for triple in &self.triples {
            if !in_range(triple.subject, sizes.0)
                || !in_range(triple.predicate, sizes.1)
                || !in_range(triple.object, sizes.2)
            {
                return Err(format!("triple {:?} references an unknown term", triple));
            }
        }
        if self.predicate_counts.len() != sizes.1 as usize + 1
            || self.object_counts.len() != sizes.2 as usize + 1
        {
            return Err("occurrence tables do not match the dictionary".to_string());
        }
        Ok(())
    }

    /// Range of triples whose leading bound components equal the pattern's, plus
    /// whether any bound component lies after the first wildcard.
    fn prefix_range(&self, pattern: &ResolvedPattern) -> (usize, usize, bool) {
        let key = [pattern.subject, pattern.predicate, pattern.object];
        let depth = key.iter().take_while(|id| **id != 0).count();
        let needs_filter = key[depth..].iter().any(|id| *id != 0);

        let project = |t: &TripleId| -> [TermId; 3] {
            let full = [t.subject, t.predicate, t.object];
            let mut out = [0; 3];
            out[..depth].copy_from_slice(&full[..depth]);
            out
        };
        let mut bound = [0; 3];
        bound[..depth].copy_from_slice(&key[..depth]);

        let lo = self.triples.partition_point(|t| project(t) < bound);
        let hi = self.triples.partition_point(|t| project(t) <= bound);
        (lo, hi, needs_filter)
    }

    fn estimate_filtered(&self, pattern: &ResolvedPattern, range_len: usize) -> CountEstimate {
        let predicate_count = self.predicate_counts.get(pattern.predicate as usize).copied();
        let object_count = self.object_counts.get(pattern.object as usize).copied();
        match (pattern.subject, pattern.predicate, pattern.object) {
            (0, p, 0) if p != 0 => CountEstimate::exact(predicate_count.unwrap_or(0)),
            (0, 0, o) if o != 0 => CountEstimate::exact(object_count.unwrap_or(0)),
            (_, p, o) => {
                let mut bound = range_len;
                if p != 0 {
                    bound = bound.min(predicate_count.unwrap_or(0));
                }
                if o != 0 {
                    bound = bound.min(object_count.unwrap_or(0));
                }
                CountEstimate::approximate(bound)
            }
        }
    }
}

impl TripleIndex for MemoryIndex {
    fn features(&self) -> IndexFeatures {
        IndexFeatures { literal_search: self.literal_search }
    }

    fn resolve_id(&self, term: &str, role: Role) -> Result<TermId> {
        Ok(self.dictionary.string_to_id(term, role))
    }

    fn id_to_string(&self, id: TermId, role: Role) -> Result<String> {
        self.dictionary
            .id_to_string(id, role)
            .map(str::to_string)
            .ok_or_else(|| Error::Index(format!("no {role} with ID {id}")))
    }

    fn search_ids(
        &self,
        subject: TermId,
        predicate: TermId,
        object: TermId,
    ) -> Result<Box<dyn TripleIdIter + '_>> {
        let pattern = ResolvedPattern { subject, predicate, object, unsatisfiable: false };
        let (lo, hi, needs_filter) = self.prefix_range(&pattern);
        let slice = &self.triples[lo..hi];
        debug!(subject, predicate, object, range = slice.len(), needs_filter, "opened id iterator");

        if needs_filter {
            let estimate = self.estimate_filtered(&pattern, slice.len());
            Ok(Box::new(FilterIter { triples: slice, pos: 0, pattern, peeked: None, estimate }))
        } else {
            Ok(Box::new(RangeIter { triples: slice, pos: 0 }))
        }
    }

    fn substring_search(
        &self,
        text: &str,
        offset: usize,
        limit: Limit,
    ) -> Result<(Vec<TermId>, usize)> {
        if !self.literal_search {
            return Err(Error::Unsupported("literal substring search".to_string()));
        }
        let matches: Vec<TermId> = self.dictionary.literal_ids_containing(text).collect();
        let total = matches.len();
        let take = match limit {
            Limit::Unbounded => usize::MAX,
            Limit::At(n) => n,
        };
        Ok((matches.into_iter().skip(offset).take(take).collect(), total))
    }

    fn predicates(&self) -> Result<Box<dyn Iterator<Item = String> + '_>> {
        Ok(Box::new(self.dictionary.predicates.iter().map(|(_, term)| term.to_string())))
    }

    fn terms_with_prefix(&self, prefix: &str, role: Role, limit: usize) -> Result<Vec<String>> {
        let section = self.dictionary.section(role);
        section
            .prefix_ids(prefix)
            .take(limit)
            .map(|id| {
                section
                    .id_to_string(id)
                    .map(str::to_string)
                    .ok_or_else(|| Error::Index(format!("no {role} with ID {id}")))
            })
            .collect()
    }
}

/// Contiguous match set: exact count, positional seek.
struct RangeIter<'a> {
    triples: &'a [TripleId],
    pos: usize,
}

impl TripleIdIter for RangeIter<'_> {
    fn has_next(&mut self) -> Result<bool> {
        Ok(self.pos < self.triples.len())
    }

    fn next_triple(&mut self) -> Result<Option<TripleId>> {
        let next = self.triples.get(self.pos).copied();
        if next.is_some() {
            self.pos += 1;
        }
        Ok(next)
    }

    fn estimated_count(&self) -> CountEstimate {
        CountEstimate::exact(self.triples.len())
    }

    fn can_seek(&self) -> bool {
        true
    }

    fn seek(&mut self, n: usize) -> Result<()> {
        if n >= self.triples.len() {
            return Err(Error::SeekOutOfRange { offset: n, len: self.triples.len() });
        }
        self.pos = n;
        Ok(())
    }
}

/// Scan of a prefix range keeping the triples that match the trailing bound components.
struct FilterIter<'a> {
    triples: &'a [TripleId],
    pos: usize,
    pattern: ResolvedPattern,
    peeked: Option<TripleId>,
    estimate: CountEstimate,
}

impl FilterIter<'_> {
    fn advance(&mut self) -> Option<TripleId> {
        while let Some(triple) = self.triples.get(self.pos) {
            self.pos += 1;
            if self.pattern.matches(triple) {
                return Some(*triple);
            }
        }
        None
    }
}

impl TripleIdIter for FilterIter<'_> {
    fn has_next(&mut self) -> Result<bool> {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        Ok(self.peeked.is_some())
    }

    fn next_triple(&mut self) -> Result<Option<TripleId>> {
        match self.peeked.take() {
            Some(triple) => Ok(Some(triple)),
            None => Ok(self.advance()),
        }
    }

    fn estimated_count(&self) -> CountEstimate {
        self.estimate
    }
}

/// Builds a [`MemoryIndex`] from string triples. Object literals may be given in either
/// `"v"^^datatype` or `"v"^^<datatype>` form.
#[derive(Debug)]
pub struct MemoryIndexBuilder {
    dictionary: DictionaryBuilder,
    raw: Vec<(String, String, String)>,
    literal_search: bool,
}

impl Default for MemoryIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIndexBuilder {
    /// Empty builder with literal search enabled.
    pub fn new() -> Self {
        Self { dictionary: DictionaryBuilder::new(), raw: Vec::new(), literal_search: true }
    }

    /// Disables literal substring search, as for dictionaries without a literal index.
    pub fn literal_search(mut self, enabled: bool) -> Self {
        self.literal_search = enabled;
        self
    }

    /// Adds one triple; duplicates are dropped at build time.
    pub fn add(&mut self, subject: &str, predicate: &str, object: &str) -> &mut Self {
        self.dictionary.insert(subject, predicate, object);
        self.raw.push((subject.to_string(), predicate.to_string(), to_internal(object)));
        self
    }

    /// Reads `subject<TAB>predicate<TAB>object` lines. Blank lines and lines starting
    /// with `#` are skipped.
    pub fn add_tsv<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut added = 0;
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.trim().is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut parts = trimmed.splitn(3, '\t');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(s), Some(p), Some(o)) if !s.is_empty() && !p.is_empty() && !o.is_empty() => {
                    self.add(s, p, o);
                    added += 1;
                }
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "line {}: expected three tab-separated terms",
                        number + 1
                    )))
                }
            }
        }
        Ok(added)
    }

    /// Sorts and deduplicates the triples and counts occurrences.
    pub fn build(self) -> MemoryIndex {
        let dictionary = self.dictionary.build();
        let mut triples: Vec<TripleId> = self
            .raw
            .iter()
            .map(|(s, p, o)| {
                TripleId::new(
                    dictionary.string_to_id(s, Role::Subject),
                    dictionary.string_to_id(p, Role::Predicate),
                    dictionary.string_to_id(o, Role::Object),
                )
            })
            .collect();
        triples.sort_unstable();
        triples.dedup();

        let mut predicate_counts = vec![0; dictionary.predicates.len() + 1];
        let mut object_counts = vec![0; dictionary.objects.len() + 1];
        for triple in &triples {
            predicate_counts[triple.predicate as usize] += 1;
            object_counts[triple.object as usize] += 1;
        }

        MemoryIndex {
            dictionary,
            triples,
            predicate_counts,
            object_counts,
            literal_search: self.literal_search,
        }
    }
}
