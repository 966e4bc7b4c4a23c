//! Amino acid alphabet and ambiguity classes
//!
//! Four one-letter codes stand for a set of residues rather than a single one:
//!
//! | code | residues      |
//! |------|---------------|
//! | `B`  | D, N          |
//! | `J`  | I, L          |
//! | `Z`  | E, Q          |
//! | `X`  | any residue   |
//!
//! Aligning one of these against a member of its set is an *ambiguous*
//! substitution and is paid from the ambiguity budget, every other difference
//! is a literal *mismatch*.

/// N-terminal sentinel used as "residue before" at the start of a protein
pub const N_TERMINAL_AA: u8 = b'[';
/// C-terminal sentinel used as "residue after" at the end of a protein
pub const C_TERMINAL_AA: u8 = b']';

/// Unknown-residue filler
pub const UNKNOWN_AA: u8 = b'X';

/// How a corpus residue relates to a needle residue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    Exact,
    Ambiguous,
    Mismatch,
}

/// Residues a code can stand for (`None` for concrete residues and `X`)
fn expansion(code: u8) -> Option<&'static [u8]> {
    match code {
        b'B' => Some(b"DN"),
        b'J' => Some(b"IL"),
        b'Z' => Some(b"EQ"),
        _ => None,
    }
}

/// Classify aligning corpus residue `corpus` against needle residue `needle`.
///
/// The relation is symmetric, so it does not matter which side carries the
/// ambiguous code.
pub fn substitution(corpus: u8, needle: u8) -> Substitution {
    if corpus == needle {
        return Substitution::Exact;
    }
    if corpus == UNKNOWN_AA || needle == UNKNOWN_AA {
        return Substitution::Ambiguous;
    }
    match (expansion(corpus), expansion(needle)) {
        (Some(set), None) if set.contains(&needle) => Substitution::Ambiguous,
        (None, Some(set)) if set.contains(&corpus) => Substitution::Ambiguous,
        (Some(a), Some(b)) if a.iter().any(|r| b.contains(r)) => Substitution::Ambiguous,
        _ => Substitution::Mismatch,
    }
}

/// True when `a` and `b` differ but one may stand for the other
pub fn is_ambiguous_substitute(a: u8, b: u8) -> bool {
    substitution(a, b) == Substitution::Ambiguous
}

/// Map I/L equivalent residues onto `I` in place.
pub fn fold_isobaric(sequence: &mut [u8]) {
    for residue in sequence.iter_mut() {
        if matches!(*residue, b'L' | b'J') {
            *residue = b'I';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_mismatch() {
        assert_eq!(substitution(b'A', b'A'), Substitution::Exact);
        assert_eq!(substitution(b'A', b'C'), Substitution::Mismatch);
        assert_eq!(substitution(b'B', b'B'), Substitution::Exact);
    }

    #[test]
    fn test_ambiguous_codes() {
        assert_eq!(substitution(b'B', b'D'), Substitution::Ambiguous);
        assert_eq!(substitution(b'B', b'N'), Substitution::Ambiguous);
        assert_eq!(substitution(b'B', b'E'), Substitution::Mismatch);
        assert_eq!(substitution(b'Z', b'Q'), Substitution::Ambiguous);
        assert_eq!(substitution(b'J', b'L'), Substitution::Ambiguous);
        assert_eq!(substitution(b'X', b'W'), Substitution::Ambiguous);
        assert_eq!(substitution(b'X', b'B'), Substitution::Ambiguous);
        // disjoint classes
        assert_eq!(substitution(b'B', b'Z'), Substitution::Mismatch);
        assert!(is_ambiguous_substitute(b'N', b'B'));
        assert!(!is_ambiguous_substitute(b'N', b'N'));
    }

    #[test]
    fn test_symmetry() {
        for a in b"ABCDEFGHIJKLMNPQRSTVWXYZ" {
            for b in b"ABCDEFGHIJKLMNPQRSTVWXYZ" {
                assert_eq!(substitution(*a, *b), substitution(*b, *a));
            }
        }
    }

    #[test]
    fn test_fold_isobaric() {
        let mut seq = b"LJIKL".to_vec();
        fold_isobaric(&mut seq);
        assert_eq!(seq, b"IIIKI");
    }
}
