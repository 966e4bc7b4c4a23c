//! Chunked access to a protein database
//!
//! A database is consumed front to back in chunks. Entry indices are global:
//! the first entry of a chunk has index `offset()`, so indices stay unique
//! across chunks and give a total order over the whole database.
//!
//! The engine stores entry indices and residue positions as `u32`: a
//! database may hold at most `u32::MAX` entries of at most `u32::MAX`
//! residues each, larger input is rejected as invalid.

use crate::sequence::ProteinEntry;
use pepindex_core::PepIndexResult;

/// Cursor over a protein database
pub trait CorpusSource: Send {
    /// Load up to `max_entries` further entries. An empty chunk marks the end
    /// of the database.
    fn cache_next(&mut self, max_entries: usize) -> PepIndexResult<CorpusChunk>;

    /// Number of entries handed out so far
    fn entries_read(&self) -> usize;
}

/// A resident slice of the database
#[derive(Debug, Clone, Default)]
pub struct CorpusChunk {
    offset: usize,
    entries: Vec<ProteinEntry>,
}

impl CorpusChunk {
    pub fn new(offset: usize, entries: Vec<ProteinEntry>) -> Self {
        Self { offset, entries }
    }

    /// Global index of the first entry
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at chunk-local index `i`
    pub fn read_at(&self, i: usize) -> &ProteinEntry {
        &self.entries[i]
    }

    pub fn entries(&self) -> &[ProteinEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [ProteinEntry] {
        &mut self.entries
    }

    pub fn into_entries(self) -> Vec<ProteinEntry> {
        self.entries
    }
}

/// In-memory database, mostly for tests and small inputs
#[derive(Debug, Clone, Default)]
pub struct VecCorpus {
    entries: Vec<ProteinEntry>,
    position: usize,
}

impl VecCorpus {
    pub fn new(entries: Vec<ProteinEntry>) -> Self {
        Self {
            entries,
            position: 0,
        }
    }

    /// Build from `(accession, sequence)` pairs
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(id, seq)| ProteinEntry::new(id.to_string(), seq.as_bytes().to_vec()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CorpusSource for VecCorpus {
    fn cache_next(&mut self, max_entries: usize) -> PepIndexResult<CorpusChunk> {
        let start = self.position;
        let end = (start + max_entries).min(self.entries.len());
        self.position = end;
        Ok(CorpusChunk::new(start, self.entries[start..end].to_vec()))
    }

    fn entries_read(&self) -> usize {
        self.position
    }
}
