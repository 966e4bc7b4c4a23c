//! Distinct peptide sequences to look up, and which query uses which

use pepindex_bio::alphabet::fold_isobaric;
use pepindex_bio::identification::{unmodified_sequence, IdentificationDocument};
use pepindex_core::{PepIndexError, PepIndexResult};
use rustc_hash::FxHashMap;

/// Deduplicated, normalized needle sequences
///
/// Needle ids are dense, assigned in first-seen order, and are the identity
/// used by every later stage. Queries are the peptide hits of a document in
/// traversal order (identifications, then hits); each maps to one needle.
#[derive(Debug, Clone, Default)]
pub struct NeedleSet {
    il_equivalent: bool,
    sequences: Vec<Vec<u8>>,
    index: FxHashMap<Vec<u8>, u32>,
    queries: Vec<u32>,
}

impl NeedleSet {
    pub fn new(il_equivalent: bool) -> Self {
        Self {
            il_equivalent,
            ..Self::default()
        }
    }

    /// Collect the needles of every peptide hit in `document`.
    pub fn from_document(document: &IdentificationDocument, il_equivalent: bool) -> PepIndexResult<Self> {
        let mut set = Self::new(il_equivalent);
        for identification in &document.peptides {
            for hit in &identification.hits {
                let id = set.insert(&hit.sequence)?;
                set.queries.push(id);
            }
        }
        Ok(set)
    }

    /// Residue string searched for an annotated peptide sequence
    pub fn normalize(&self, annotated: &str) -> Vec<u8> {
        let mut sequence: Vec<u8> = unmodified_sequence(annotated).into_bytes();
        if self.il_equivalent {
            fold_isobaric(&mut sequence);
        }
        sequence
    }

    /// Register a sequence and return its needle id.
    pub fn insert(&mut self, annotated: &str) -> PepIndexResult<u32> {
        let sequence = self.normalize(annotated);
        if sequence.is_empty() {
            return Err(PepIndexError::InvalidInput(format!(
                "peptide sequence '{}' has no residues",
                annotated
            )));
        }
        if let Some(&id) = self.index.get(&sequence) {
            return Ok(id);
        }
        let id = self.sequences.len() as u32;
        self.index.insert(sequence.clone(), id);
        self.sequences.push(sequence);
        Ok(id)
    }

    pub fn lookup(&self, annotated: &str) -> Option<u32> {
        self.index.get(&self.normalize(annotated)).copied()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequence(&self, id: u32) -> &[u8] {
        &self.sequences[id as usize]
    }

    /// Needle sequences in id order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.sequences.iter().map(Vec::as_slice)
    }

    /// Needle of the `query`-th peptide hit collected by `from_document`
    pub fn query_needle(&self, query: usize) -> u32 {
        self.queries[query]
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepindex_bio::identification::{PeptideHit, PeptideIdentification};

    fn document(sequences: &[&str]) -> IdentificationDocument {
        IdentificationDocument {
            proteins: Vec::new(),
            peptides: vec![PeptideIdentification {
                identifier: "run".to_string(),
                hits: sequences.iter().map(|s| PeptideHit::new(*s)).collect(),
            }],
        }
    }

    #[test]
    fn test_modified_forms_share_a_needle() {
        let doc = document(&["PEPTIDE", "PEPM(Oxidation)K", "PEPTIDE", "PEPMK"]);
        let set = NeedleSet::from_document(&doc, false).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.query_count(), 4);
        assert_eq!(set.query_needle(0), set.query_needle(2));
        assert_eq!(set.query_needle(1), set.query_needle(3));
        assert_eq!(set.sequence(set.query_needle(1)), b"PEPMK");
    }

    #[test]
    fn test_isobaric_folding() {
        let doc = document(&["PEPLIDE", "PEPIIDE", "PEPJIDE"]);
        let folded = NeedleSet::from_document(&doc, true).unwrap();
        assert_eq!(folded.len(), 1);
        assert_eq!(folded.sequence(0), b"PEPIIDE");

        let plain = NeedleSet::from_document(&doc, false).unwrap();
        assert_eq!(plain.len(), 3);
        assert_eq!(plain.lookup("PEPL(Oxidation)IDE"), Some(0));
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let doc = document(&["PEPTIDE", "(Acetyl)"]);
        assert!(matches!(
            NeedleSet::from_document(&doc, false),
            Err(PepIndexError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_document() {
        let set = NeedleSet::from_document(&IdentificationDocument::default(), false).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
