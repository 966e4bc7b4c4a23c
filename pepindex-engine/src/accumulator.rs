//! Validated hits collected per worker

use pepindex_bio::alphabet::{C_TERMINAL_AA, N_TERMINAL_AA};
use pepindex_bio::digestion::ValidityPredicate;

use crate::automaton::Hit;

/// A hit that passed the cleavage check
///
/// Field order is the sort order: needle, entry, position, flanking residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchRecord {
    pub needle: u32,
    /// Global database index of the protein
    pub entry: u32,
    pub position: u32,
    /// Residue before the match, `[` at the protein N-terminus
    pub aa_before: u8,
    /// Residue after the match, `]` at the protein C-terminus
    pub aa_after: u8,
}

/// Growable record buffer with accept/reject counters
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    records: Vec<MatchRecord>,
    accepted: usize,
    rejected: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one raw hit. Rejected hits only bump the counter.
    ///
    /// `start` must fit in a `u32`; the corpus driver rejects longer proteins
    /// before they are searched.
    pub fn add_hit(
        &mut self,
        is_valid: bool,
        needle: u32,
        entry: u32,
        len: usize,
        protein: &[u8],
        start: usize,
    ) {
        if !is_valid {
            self.rejected += 1;
            return;
        }

        let aa_before = if start == 0 {
            N_TERMINAL_AA
        } else {
            protein[start - 1]
        };
        let aa_after = if start + len >= protein.len() {
            C_TERMINAL_AA
        } else {
            protein[start + len]
        };

        self.records.push(MatchRecord {
            needle,
            entry,
            position: start as u32,
            aa_before,
            aa_after,
        });
        self.accepted += 1;
    }

    /// Validate `hit` against `protein` and record it.
    pub fn add_checked(
        &mut self,
        predicate: &dyn ValidityPredicate,
        allow_nterm_protein_cleavage: bool,
        hit: &Hit,
        entry: u32,
        protein: &[u8],
    ) {
        let valid = predicate.is_valid(protein, hit.start, hit.len, allow_nterm_protein_cleavage);
        self.add_hit(valid, hit.needle, entry, hit.len, protein, hit.start);
    }

    /// Move every record of `other` into `self` and add up the counters.
    pub fn merge(&mut self, other: &mut Accumulator) {
        if self.records.is_empty() {
            std::mem::swap(&mut self.records, &mut other.records);
        } else {
            self.records.append(&mut other.records);
        }
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        other.accepted = 0;
        other.rejected = 0;
    }

    /// Sort records and drop exact repeats.
    pub fn sort_dedup(&mut self) {
        self.records.sort_unstable();
        self.records.dedup();
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<MatchRecord> {
        &mut self.records
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
