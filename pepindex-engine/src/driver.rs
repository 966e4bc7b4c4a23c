//! Chunked, data-parallel scan of a protein database
//!
//! The database is read a chunk at a time. While a chunk is searched, the
//! next one is read on a separate scoped thread, so at most two chunks are
//! resident and reading never occupies a search worker. Inside a chunk,
//! entries are processed in batches by the workers of a local thread pool,
//! each with its own scan state and accumulator; the partial results are
//! reduced once the chunk is done.

use indicatif::ProgressBar;
use pepindex_bio::alphabet::fold_isobaric;
use pepindex_bio::corpus::{CorpusChunk, CorpusSource};
use pepindex_bio::decoy::DecoyLabel;
use pepindex_bio::digestion::ValidityPredicate;
use pepindex_bio::sequence::ProteinEntry;
use pepindex_core::{PepIndexError, PepIndexResult};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};
use smallvec::{smallvec, SmallVec};
use std::collections::hash_map::Entry;
use std::hash::Hasher;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use crate::accumulator::Accumulator;
use crate::automaton::{Automaton, MatchState};

/// Entries with modification syntax logged individually
const INVALID_CONTENT_LOG_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Worker threads, 0 for one per core
    pub threads: usize,
    pub chunk_size: usize,
    pub batch_size: usize,
    pub il_equivalent: bool,
    pub allow_nterm_protein_cleavage: bool,
    /// Keep the searched sequence of referenced entries
    pub keep_sequence: bool,
    /// Keep the FASTA description of referenced entries
    pub keep_description: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            chunk_size: 400_000,
            batch_size: 100,
            il_equivalent: false,
            allow_nterm_protein_cleavage: true,
            keep_sequence: false,
            keep_description: false,
        }
    }
}

/// A database entry that produced at least one validated match
///
/// Sequence and description are only carried when the driver was asked to
/// keep them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedEntry {
    pub accession: String,
    pub description: Option<String>,
    /// Sequence as searched (after preprocessing)
    pub sequence: Option<Vec<u8>>,
    pub is_decoy: bool,
}

/// Hash of a preprocessed sequence, used to compare repeated accessions
pub fn sequence_hash(sequence: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(sequence);
    hasher.finish()
}

/// Where one accession occurs in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionOccurrences {
    /// Sequence hash of the occurrence seen first
    pub hash: u64,
    /// Global entry indices, in no particular order
    pub indices: SmallVec<[u32; 1]>,
    /// Some occurrence has a different sequence
    pub conflicting: bool,
}

impl AccessionOccurrences {
    fn absorb(&mut self, other: AccessionOccurrences) {
        self.conflicting |= other.conflicting || other.hash != self.hash;
        self.indices.extend(other.indices);
    }

    /// Smallest global index, the occurrence repeats collapse onto
    pub fn first(&self) -> u32 {
        self.indices.iter().copied().min().unwrap_or_default()
    }
}

/// Accession of every scanned entry, matched or not
#[derive(Debug, Clone, Default)]
pub struct AccessionTable {
    entries: FxHashMap<String, AccessionOccurrences>,
}

impl AccessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, accession: &str, sequence: &[u8], index: u32) {
        let occurrence = AccessionOccurrences {
            hash: sequence_hash(sequence),
            indices: smallvec![index],
            conflicting: false,
        };
        match self.entries.get_mut(accession) {
            Some(existing) => existing.absorb(occurrence),
            None => {
                self.entries.insert(accession.to_string(), occurrence);
            }
        }
    }

    pub fn merge(&mut self, other: AccessionTable) {
        if self.entries.is_empty() {
            self.entries = other.entries;
            return;
        }
        for (accession, occurrences) in other.entries {
            match self.entries.entry(accession) {
                Entry::Occupied(mut slot) => slot.get_mut().absorb(occurrences),
                Entry::Vacant(slot) => {
                    slot.insert(occurrences);
                }
            }
        }
    }

    /// Distinct accessions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accessions seen more than once, sorted by accession
    pub fn repeated(&self) -> Vec<(&str, &AccessionOccurrences)> {
        let mut repeated: Vec<(&str, &AccessionOccurrences)> = self
            .entries
            .iter()
            .filter(|(_, occ)| occ.indices.len() > 1)
            .map(|(accession, occ)| (accession.as_str(), occ))
            .collect();
        repeated.sort_by(|a, b| a.0.cmp(b.0));
        repeated
    }
}

/// Everything a scan leaves behind for the evidence pass
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub accumulator: Accumulator,
    /// Global entry index to referenced entry
    pub referenced: FxHashMap<u32, ReferencedEntry>,
    pub accessions: AccessionTable,
    pub entries_scanned: usize,
    pub entries_invalid_content: usize,
    pub entries_with_j: usize,
}

impl ScanResult {
    pub fn merge(&mut self, mut other: ScanResult) {
        self.accumulator.merge(&mut other.accumulator);
        if self.referenced.is_empty() {
            self.referenced = other.referenced;
        } else {
            self.referenced.extend(other.referenced);
        }
        self.accessions.merge(other.accessions);
        self.entries_scanned += other.entries_scanned;
        self.entries_invalid_content += other.entries_invalid_content;
        self.entries_with_j += other.entries_with_j;
    }
}

/// Entry indices and match positions are stored as `u32`.
fn check_addressable(chunk: &CorpusChunk) -> PepIndexResult<()> {
    let end = chunk.offset() + chunk.size();
    if u32::try_from(end).is_err() {
        return Err(PepIndexError::InvalidInput(format!(
            "database has more than {} entries",
            u32::MAX
        )));
    }
    if let Some(entry) = chunk
        .entries()
        .iter()
        .find(|e| u32::try_from(e.len()).is_err())
    {
        return Err(PepIndexError::InvalidInput(format!(
            "protein '{}' is longer than {} residues",
            entry.id,
            u32::MAX
        )));
    }
    Ok(())
}

#[derive(Default)]
struct WorkerState {
    matcher: MatchState,
    result: ScanResult,
}

impl WorkerState {
    fn merge(mut self, other: WorkerState) -> WorkerState {
        self.result.merge(other.result);
        self
    }
}

pub struct CorpusDriver<'a> {
    automaton: &'a Automaton,
    predicate: &'a dyn ValidityPredicate,
    decoy: &'a DecoyLabel,
    options: DriverOptions,
    pool: rayon::ThreadPool,
}

impl<'a> CorpusDriver<'a> {
    pub fn new(
        automaton: &'a Automaton,
        predicate: &'a dyn ValidityPredicate,
        decoy: &'a DecoyLabel,
        options: DriverOptions,
    ) -> PepIndexResult<Self> {
        if options.chunk_size == 0 || options.batch_size == 0 {
            return Err(PepIndexError::IllegalParameters(
                "chunk and batch sizes must be positive".to_string(),
            ));
        }

        let threads = if options.threads == 0 {
            num_cpus::get()
        } else {
            options.threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| PepIndexError::Other(format!("Failed to build thread pool: {}", e)))?;

        Ok(Self {
            automaton,
            predicate,
            decoy,
            options,
            pool,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Scan the whole database. Fails with `EmptyCorpus` if the first chunk
    /// is empty.
    pub fn run(
        &self,
        source: &mut dyn CorpusSource,
        progress: Option<&ProgressBar>,
    ) -> PepIndexResult<ScanResult> {
        let chunk_size = self.options.chunk_size;
        let mut active = source.cache_next(chunk_size)?;
        if active.is_empty() {
            return Err(PepIndexError::EmptyCorpus);
        }
        check_addressable(&active)?;

        let processed = AtomicUsize::new(0);
        let invalid_logged = AtomicUsize::new(0);
        let mut total = ScanResult::default();
        let mut chunk_count = 0usize;

        while !active.is_empty() {
            chunk_count += 1;
            debug!(
                "Searching chunk {} ({} entries from index {})",
                chunk_count,
                active.size(),
                active.offset()
            );

            let (next, scanned) = std::thread::scope(|scope| {
                let prefetch = scope.spawn(|| source.cache_next(chunk_size));
                let scanned = self.pool.install(|| {
                    self.scan_chunk(&mut active, &processed, &invalid_logged, progress)
                });
                (prefetch.join(), scanned)
            });

            total.merge(scanned);
            active = next.map_err(|_| {
                PepIndexError::Other("database reader thread panicked".to_string())
            })??;
            check_addressable(&active)?;
        }

        total.accumulator.sort_dedup();
        debug!(
            "Scanned {} entries in {} chunk(s): {} hits accepted, {} rejected",
            total.entries_scanned,
            chunk_count,
            total.accumulator.accepted(),
            total.accumulator.rejected()
        );
        Ok(total)
    }

    fn scan_chunk(
        &self,
        chunk: &mut CorpusChunk,
        processed: &AtomicUsize,
        invalid_logged: &AtomicUsize,
        progress: Option<&ProgressBar>,
    ) -> ScanResult {
        let offset = chunk.offset();
        let batch_size = self.options.batch_size;

        chunk
            .entries_mut()
            .par_chunks_mut(batch_size)
            .enumerate()
            .fold(WorkerState::default, |mut state, (batch_idx, batch)| {
                for (i, entry) in batch.iter_mut().enumerate() {
                    // fits, see check_addressable
                    let global = (offset + batch_idx * batch_size + i) as u32;
                    self.scan_entry(&mut state, entry, global, invalid_logged);
                }

                let done = processed.fetch_add(batch.len(), Ordering::Relaxed) + batch.len();
                if let Some(pb) = progress {
                    pb.set_position(done as u64);
                }
                state
            })
            .reduce(WorkerState::default, WorkerState::merge)
            .result
    }

    fn scan_entry(
        &self,
        state: &mut WorkerState,
        entry: &mut ProteinEntry,
        global: u32,
        invalid_logged: &AtomicUsize,
    ) {
        let result = &mut state.result;
        result.entries_scanned += 1;

        entry.sequence.retain(|&c| c != b'*');
        if self.options.il_equivalent {
            fold_isobaric(&mut entry.sequence);
        } else if entry.sequence.contains(&b'J') {
            result.entries_with_j += 1;
        }

        result.accessions.insert(&entry.id, &entry.sequence, global);

        if entry.has_modification_syntax() {
            result.entries_invalid_content += 1;
            if invalid_logged.fetch_add(1, Ordering::Relaxed) < INVALID_CONTENT_LOG_LIMIT {
                warn!(
                    "Protein '{}' contains modification syntax ('[' or '('); it should be a plain sequence",
                    entry.id
                );
            }
        }

        let hits = state.matcher.search(self.automaton, &entry.sequence);
        if hits.is_empty() {
            return;
        }

        let accepted_before = result.accumulator.accepted();
        for hit in hits {
            result.accumulator.add_checked(
                self.predicate,
                self.options.allow_nterm_protein_cleavage,
                hit,
                global,
                &entry.sequence,
            );
        }

        if result.accumulator.accepted() > accepted_before {
            result.referenced.insert(
                global,
                ReferencedEntry {
                    accession: entry.id.clone(),
                    description: if self.options.keep_description {
                        entry.description.clone()
                    } else {
                        None
                    },
                    sequence: self.options.keep_sequence.then(|| entry.sequence.clone()),
                    is_decoy: self.decoy.is_decoy(&entry.id),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::SearchBudget;
    use pepindex_bio::corpus::VecCorpus;
    use pepindex_bio::digestion::ProteaseDigestion;
    use pepindex_core::Specificity;

    fn options(threads: usize) -> DriverOptions {
        DriverOptions {
            threads,
            chunk_size: 2,
            batch_size: 1,
            ..DriverOptions::default()
        }
    }

    #[test]
    fn test_scan_over_several_chunks() {
        let ac = Automaton::build([&b"PEP"[..], &b"EPT"[..]], SearchBudget::exact()).unwrap();
        let predicate = ProteaseDigestion::new("Trypsin", Specificity::None).unwrap();
        let decoy = DecoyLabel::default();

        let mut corpus = VecCorpus::from_pairs([
            ("P1", "XPEPTIDEX"),
            ("P2", "AAAAA"),
            ("DECOY_P1", "XEDITPEPX"),
            ("P4", "PE*P"),
            ("P5", "KKK"),
        ]);
        let driver = CorpusDriver::new(
            &ac,
            &predicate,
            &decoy,
            DriverOptions {
                keep_sequence: true,
                ..options(2)
            },
        )
        .unwrap();
        let result = driver.run(&mut corpus, None).unwrap();

        assert_eq!(result.entries_scanned, 5);
        let found: Vec<(u32, u32, u32)> = result
            .accumulator
            .records()
            .iter()
            .map(|r| (r.needle, r.entry, r.position))
            .collect();
        assert_eq!(found, vec![(0, 0, 1), (0, 2, 5), (0, 3, 0), (1, 0, 2)]);

        assert_eq!(result.referenced.len(), 3);
        assert!(result.referenced[&2].is_decoy);
        assert!(!result.referenced[&0].is_decoy);
        // stop codons are removed before searching
        assert_eq!(result.referenced[&3].sequence.as_deref(), Some(&b"PEP"[..]));
        // every entry is listed, matched or not
        assert_eq!(result.accessions.len(), 5);
        assert!(result.accessions.repeated().is_empty());
    }

    #[test]
    fn test_referenced_entries_drop_unrequested_data() {
        let ac = Automaton::build([&b"PEP"[..]], SearchBudget::exact()).unwrap();
        let predicate = ProteaseDigestion::new("Trypsin", Specificity::None).unwrap();
        let decoy = DecoyLabel::default();
        let driver = CorpusDriver::new(&ac, &predicate, &decoy, options(1)).unwrap();

        let mut corpus = VecCorpus::new(vec![
            ProteinEntry::new("P1".to_string(), b"KPEPK".to_vec()).with_description("first".to_string()),
        ]);
        let result = driver.run(&mut corpus, None).unwrap();
        let entry = &result.referenced[&0];
        assert_eq!(entry.accession, "P1");
        assert_eq!(entry.sequence, None);
        assert_eq!(entry.description, None);
    }

    #[test]
    fn test_repeated_accessions_are_tracked_without_matches() {
        let ac = Automaton::build([&b"PEPTIDE"[..]], SearchBudget::exact()).unwrap();
        let predicate = ProteaseDigestion::new("Trypsin", Specificity::None).unwrap();
        let decoy = DecoyLabel::default();
        let driver = CorpusDriver::new(&ac, &predicate, &decoy, options(2)).unwrap();

        let mut corpus = VecCorpus::from_pairs([
            ("P1", "KPEPTIDER"),
            ("P2", "WWWW"),
            ("P1", "GGGGGGG"),
            ("P2", "WW*WW"),
        ]);
        let result = driver.run(&mut corpus, None).unwrap();
        assert_eq!(result.referenced.len(), 1);

        let repeated = result.accessions.repeated();
        assert_eq!(repeated.len(), 2);
        let (accession, p1) = repeated[0];
        assert_eq!(accession, "P1");
        assert!(p1.conflicting);
        // identical once the stop codon is removed
        let (accession, p2) = repeated[1];
        assert_eq!(accession, "P2");
        assert!(!p2.conflicting);
        assert_eq!(p2.first(), 1);
    }

    #[test]
    fn test_accession_table_merge() {
        let mut a = AccessionTable::new();
        a.insert("P1", b"PEPK", 4);
        let mut b = AccessionTable::new();
        b.insert("P1", b"PEPK", 1);
        b.insert("P2", b"AAA", 2);
        a.merge(b);
        assert_eq!(a.len(), 2);
        let repeated = a.repeated();
        assert_eq!(repeated.len(), 1);
        assert_eq!(repeated[0].1.first(), 1);
        assert!(!repeated[0].1.conflicting);

        let mut c = AccessionTable::new();
        c.insert("P1", b"PEPR", 9);
        a.merge(c);
        assert!(a.repeated()[0].1.conflicting);
    }

    #[test]
    fn test_prefetch_with_single_worker() {
        let ac = Automaton::build([&b"PEP"[..]], SearchBudget::exact()).unwrap();
        let predicate = ProteaseDigestion::new("Trypsin", Specificity::None).unwrap();
        let decoy = DecoyLabel::default();
        let driver = CorpusDriver::new(&ac, &predicate, &decoy, options(1)).unwrap();
        assert_eq!(driver.threads(), 1);

        let pairs: Vec<(String, String)> = (0..7).map(|i| (format!("P{}", i), "APEPA".to_string())).collect();
        let mut corpus = VecCorpus::from_pairs(pairs.iter().map(|(a, s)| (a.as_str(), s.as_str())));
        let result = driver.run(&mut corpus, None).unwrap();
        assert_eq!(result.entries_scanned, 7);
        assert_eq!(result.referenced.len(), 7);
    }

    #[test]
    fn test_index_range_check() {
        let chunk = CorpusChunk::new(u32::MAX as usize, vec![ProteinEntry::new("P".to_string(), b"A".to_vec())]);
        assert!(matches!(check_addressable(&chunk), Err(PepIndexError::InvalidInput(_))));

        let chunk = CorpusChunk::new(u32::MAX as usize - 1, vec![ProteinEntry::new("P".to_string(), b"A".to_vec())]);
        assert!(check_addressable(&chunk).is_ok());
    }

    #[test]
    fn test_empty_corpus() {
        let ac = Automaton::build([&b"PEP"[..]], SearchBudget::exact()).unwrap();
        let predicate = ProteaseDigestion::new("Trypsin", Specificity::None).unwrap();
        let decoy = DecoyLabel::default();
        let driver = CorpusDriver::new(&ac, &predicate, &decoy, options(1)).unwrap();

        let result = driver.run(&mut VecCorpus::default(), None);
        assert!(matches!(result, Err(PepIndexError::EmptyCorpus)));
    }

    #[test]
    fn test_rejected_hits_do_not_reference_entries() {
        let ac = Automaton::build([&b"AC"[..]], SearchBudget::exact()).unwrap();
        let predicate = ProteaseDigestion::new("Trypsin", Specificity::Full).unwrap();
        let decoy = DecoyLabel::default();
        let driver = CorpusDriver::new(&ac, &predicate, &decoy, options(1)).unwrap();

        let mut corpus = VecCorpus::from_pairs([("P1", "KACR")]);
        let result = driver.run(&mut corpus, None).unwrap();
        assert_eq!(result.accumulator.rejected(), 1);
        assert!(result.accumulator.is_empty());
        assert!(result.referenced.is_empty());
    }

    #[test]
    fn test_content_flags() {
        let ac = Automaton::build([&b"PEP"[..]], SearchBudget::exact()).unwrap();
        let predicate = ProteaseDigestion::new("Trypsin", Specificity::None).unwrap();
        let decoy = DecoyLabel::default();
        let driver = CorpusDriver::new(&ac, &predicate, &decoy, options(1)).unwrap();

        let mut corpus = VecCorpus::from_pairs([("P1", "PEPM(Oxidation)K"), ("P2", "PEJK")]);
        let result = driver.run(&mut corpus, None).unwrap();
        assert_eq!(result.entries_invalid_content, 1);
        assert_eq!(result.entries_with_j, 1);
    }
}
