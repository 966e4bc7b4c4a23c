//! Built-in protease table

/// Cleavage rule of one protease
///
/// A site lies between residues `i - 1` and `i`. It is a cleavage site when
/// the left residue is in `cut_after` and the right one is not in
/// `not_before`, or when the right residue is in `cut_before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enzyme {
    pub name: &'static str,
    cut_after: &'static [u8],
    cut_before: &'static [u8],
    not_before: &'static [u8],
    unspecific: bool,
}

impl Enzyme {
    const fn after(name: &'static str, cut_after: &'static [u8], not_before: &'static [u8]) -> Self {
        Self {
            name,
            cut_after,
            cut_before: b"",
            not_before,
            unspecific: false,
        }
    }

    const fn before(name: &'static str, cut_before: &'static [u8]) -> Self {
        Self {
            name,
            cut_after: b"",
            cut_before,
            not_before: b"",
            unspecific: false,
        }
    }

    /// Look up a protease by name, ignoring case
    pub fn by_name(name: &str) -> Option<&'static Enzyme> {
        ENZYMES.iter().find(|e| e.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Names of all built-in proteases
    pub fn names() -> impl Iterator<Item = &'static str> {
        ENZYMES.iter().map(|e| e.name)
    }

    /// Whether the peptide bond in front of `sequence[i]` is cleaved
    pub fn is_cleavage_site(&self, sequence: &[u8], i: usize) -> bool {
        if i == 0 || i >= sequence.len() {
            return false;
        }
        if self.unspecific {
            return true;
        }
        let left = sequence[i - 1];
        let right = sequence[i];
        (self.cut_after.contains(&left) && !self.not_before.contains(&right))
            || self.cut_before.contains(&right)
    }

    /// Residues the rule depends on
    pub fn specificity_residues(&self) -> impl Iterator<Item = u8> + '_ {
        self.cut_after
            .iter()
            .chain(self.cut_before)
            .chain(self.not_before)
            .copied()
    }

    /// Folding `L` onto `I` changes the outcome of this rule when it names
    /// exactly one of the two.
    pub fn conflicts_with_il_folding(&self) -> bool {
        let mut has_i = false;
        let mut has_l = false;
        for residue in self.specificity_residues() {
            has_i |= residue == b'I';
            has_l |= residue == b'L';
        }
        has_i != has_l
    }
}

static ENZYMES: &[Enzyme] = &[
    Enzyme::after("Trypsin", b"KR", b"P"),
    Enzyme::after("Trypsin/P", b"KR", b""),
    Enzyme::after("Lys-C", b"K", b"P"),
    Enzyme::after("Lys-C/P", b"K", b""),
    Enzyme::before("Lys-N", b"K"),
    Enzyme::after("Arg-C", b"R", b"P"),
    Enzyme::after("Arg-C/P", b"R", b""),
    Enzyme::before("Asp-N", b"BD"),
    Enzyme::after("Glu-C", b"E", b"P"),
    Enzyme::after("Chymotrypsin", b"FYWL", b"P"),
    Enzyme::after("Chymotrypsin/P", b"FYWL", b""),
    Enzyme::after("CNBr", b"M", b""),
    Enzyme::after("no cleavage", b"", b""),
    Enzyme {
        name: "unspecific cleavage",
        cut_after: b"",
        cut_before: b"",
        not_before: b"",
        unspecific: true,
    },
];
