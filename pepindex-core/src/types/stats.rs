//! Run-wide counters produced by an indexing run

use serde::{Deserialize, Serialize};

/// Aggregate statistics of one indexing run
///
/// Peptide counters count peptide hits (one per hit in the identification
/// input), not distinct sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Distinct sequences fed to the automaton
    pub needles: usize,
    /// Protein entries scanned
    pub entries_scanned: usize,
    /// Raw hits accepted by the cleavage rule
    pub filter_passed: usize,
    /// Raw hits rejected by the cleavage rule
    pub filter_rejected: usize,

    pub peptides_target_only: usize,
    pub peptides_decoy_only: usize,
    pub peptides_target_decoy: usize,

    pub peptides_unmatched: usize,
    pub peptides_unique: usize,
    pub peptides_non_unique: usize,
    /// Unmatched hits dropped by the `remove` policy
    pub peptides_removed: usize,

    pub proteins_new: usize,
    pub proteins_orphaned: usize,
    pub proteins_referenced_target: usize,
    pub proteins_referenced_decoy: usize,

    /// Entries carrying modification syntax
    pub entries_invalid_content: usize,
    /// Entries carrying 'J' without I/L equivalence
    pub entries_with_j: usize,
    /// Referenced entries collapsed onto an earlier entry of the same accession
    pub duplicate_accessions: usize,
}

impl IndexStats {
    /// Peptide hits that matched at least one decoy protein
    pub fn decoy_matches(&self) -> usize {
        self.peptides_decoy_only + self.peptides_target_decoy
    }

    /// Peptide hits with at least one protein reference
    pub fn matched(&self) -> usize {
        self.peptides_unique + self.peptides_non_unique
    }

    pub fn referenced_proteins(&self) -> usize {
        self.proteins_referenced_target + self.proteins_referenced_decoy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_counts() {
        let stats = IndexStats {
            peptides_decoy_only: 2,
            peptides_target_decoy: 1,
            peptides_unique: 5,
            peptides_non_unique: 4,
            proteins_referenced_target: 7,
            proteins_referenced_decoy: 3,
            ..Default::default()
        };
        assert_eq!(stats.decoy_matches(), 3);
        assert_eq!(stats.matched(), 9);
        assert_eq!(stats.referenced_proteins(), 10);
    }
}
