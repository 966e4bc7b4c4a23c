//! Multi-needle matching with a bounded number of substitutions
//!
//! Needles go into a [`TrieBuilder`], which is compressed once into an
//! immutable [`Automaton`]. Each worker owns a [`MatchState`] that scans
//! protein sequences against the shared automaton.

pub mod compressed;
pub mod search;
pub mod trie;

pub use compressed::Automaton;
pub use search::MatchState;
pub use trie::TrieBuilder;

use pepindex_core::config::MAX_SUBSTITUTION_BUDGET;
use pepindex_core::{PepIndexError, PepIndexResult};

/// One needle occurrence in a scanned sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hit {
    pub needle: u32,
    /// Offset of the first matched residue
    pub start: usize,
    pub len: usize,
}

impl Hit {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Substitutions tolerated per occurrence
///
/// `aaa` pays for ambiguous residues (`B`, `J`, `Z`, `X` against a residue
/// they may stand for), `mismatches` for any other differing residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchBudget {
    aaa: u8,
    mismatches: u8,
}

impl SearchBudget {
    pub fn new(aaa: usize, mismatches: usize) -> PepIndexResult<Self> {
        if aaa > MAX_SUBSTITUTION_BUDGET || mismatches > MAX_SUBSTITUTION_BUDGET {
            return Err(PepIndexError::IllegalParameters(format!(
                "substitution budgets must be at most {} (got aaa={}, mismatches={})",
                MAX_SUBSTITUTION_BUDGET, aaa, mismatches
            )));
        }
        Ok(Self {
            aaa: aaa as u8,
            mismatches: mismatches as u8,
        })
    }

    /// Exact matching only
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn aaa(&self) -> usize {
        self.aaa as usize
    }

    pub fn mismatches(&self) -> usize {
        self.mismatches as usize
    }

    pub fn total(&self) -> usize {
        self.aaa() + self.mismatches()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_limits() {
        let budget = SearchBudget::new(3, 2).unwrap();
        assert_eq!(budget.total(), 5);
        assert_eq!(SearchBudget::exact().total(), 0);
        assert!(matches!(
            SearchBudget::new(11, 0),
            Err(PepIndexError::IllegalParameters(_))
        ));
    }
}
