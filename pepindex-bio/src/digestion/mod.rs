//! Protease digestion rules used to validate matched spans

pub mod enzyme;

pub use enzyme::Enzyme;

use pepindex_core::{PepIndexError, PepIndexResult, Specificity};

/// Decides whether a matched span is a plausible digestion product.
///
/// Implementations are called concurrently from every worker and must not
/// hold mutable state.
pub trait ValidityPredicate: Send + Sync {
    fn is_valid(
        &self,
        protein: &[u8],
        start: usize,
        len: usize,
        allow_n_terminal_exception: bool,
    ) -> bool;
}

/// Digestion by a single protease at a given specificity
#[derive(Debug, Clone, Copy)]
pub struct ProteaseDigestion {
    enzyme: &'static Enzyme,
    specificity: Specificity,
}

impl ProteaseDigestion {
    pub fn new(enzyme_name: &str, specificity: Specificity) -> PepIndexResult<Self> {
        let enzyme = Enzyme::by_name(enzyme_name).ok_or_else(|| {
            PepIndexError::IllegalParameters(format!(
                "unknown enzyme '{}' (known: {})",
                enzyme_name,
                Enzyme::names().collect::<Vec<_>>().join(", ")
            ))
        })?;
        Ok(Self {
            enzyme,
            specificity,
        })
    }

    pub fn enzyme(&self) -> &'static Enzyme {
        self.enzyme
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Check `protein[pos..pos + len]` against the cleavage rule.
    ///
    /// With `allow_nterm_protein_cleavage` a span starting at position 1 of a
    /// protein that begins with `M` counts as N-terminal (initiator
    /// methionine removal).
    pub fn is_valid_product(
        &self,
        protein: &[u8],
        pos: usize,
        len: usize,
        allow_nterm_protein_cleavage: bool,
    ) -> bool {
        if len == 0 || pos >= protein.len() || pos + len > protein.len() {
            return false;
        }
        if self.specificity == Specificity::None {
            return true;
        }

        let end = pos + len;
        let n_term = pos == 0
            || self.enzyme.is_cleavage_site(protein, pos)
            || (allow_nterm_protein_cleavage && pos == 1 && protein[0] == b'M');
        let c_term = end == protein.len() || self.enzyme.is_cleavage_site(protein, end);

        match self.specificity {
            Specificity::Full => n_term && c_term,
            Specificity::Semi => n_term || c_term,
            Specificity::None => true,
        }
    }
}

impl ValidityPredicate for ProteaseDigestion {
    fn is_valid(
        &self,
        protein: &[u8],
        start: usize,
        len: usize,
        allow_n_terminal_exception: bool,
    ) -> bool {
        self.is_valid_product(protein, start, len, allow_n_terminal_exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROT: &[u8] = b"ABCDEFGKABCRAAAKAARPBBBB";

    fn trypsin(specificity: Specificity) -> ProteaseDigestion {
        ProteaseDigestion::new("Trypsin", specificity).unwrap()
    }

    #[test]
    fn test_unknown_enzyme() {
        let result = ProteaseDigestion::new("Pepsin", Specificity::Full);
        assert!(matches!(result, Err(PepIndexError::IllegalParameters(_))));
    }

    #[test]
    fn test_out_of_range() {
        for spec in [Specificity::Full, Specificity::Semi, Specificity::None] {
            let pd = trypsin(spec);
            assert!(!pd.is_valid_product(PROT, 100, 3, false));
            assert!(!pd.is_valid_product(PROT, 10, 300, false));
            assert!(!pd.is_valid_product(PROT, 10, 0, false));
            assert!(!pd.is_valid_product(b"", 0, 0, false));
        }
    }

    #[test]
    fn test_full_specificity() {
        let pd = trypsin(Specificity::Full);
        assert!(!pd.is_valid_product(PROT, 0, 3, false));
        assert!(pd.is_valid_product(PROT, 0, 8, false));
        assert!(pd.is_valid_product(PROT, 8, 4, false));
        assert!(pd.is_valid_product(PROT, 8, 8, false));
        // followed by proline
        assert!(!pd.is_valid_product(PROT, 0, 19, false));
        assert!(!pd.is_valid_product(PROT, 8, 3, false));
        assert!(!pd.is_valid_product(PROT, 3, 6, false));
        assert!(!pd.is_valid_product(PROT, 1, 7, false));
        assert!(pd.is_valid_product(PROT, 0, PROT.len(), false));
    }

    #[test]
    fn test_initiator_methionine() {
        let pd = trypsin(Specificity::Full);
        let prot = b"MBCDEFGKABCRAAAKAA";
        assert!(pd.is_valid_product(prot, 1, 7, true));
        assert!(!pd.is_valid_product(prot, 1, 7, false));
        // only directly after the leading M
        assert!(!pd.is_valid_product(prot, 2, 6, true));
    }

    #[test]
    fn test_semi_specificity() {
        let pd = trypsin(Specificity::Semi);
        assert!(pd.is_valid_product(PROT, 0, 3, false));
        assert!(pd.is_valid_product(PROT, 0, 19, false));
        assert!(pd.is_valid_product(PROT, 8, 3, false));
        assert!(!pd.is_valid_product(PROT, 3, 6, false));
        assert!(pd.is_valid_product(PROT, 1, 7, false));
    }

    #[test]
    fn test_no_specificity() {
        let pd = trypsin(Specificity::None);
        assert!(pd.is_valid_product(PROT, 3, 6, false));
        assert!(pd.is_valid_product(PROT, 0, 19, false));
    }

    #[test]
    fn test_predicate_object() {
        let pd: Box<dyn ValidityPredicate> = Box::new(trypsin(Specificity::Full));
        assert!(pd.is_valid(b"KACR", 1, 3, false));
        assert!(!pd.is_valid(b"KACR", 1, 2, false));
    }
}
