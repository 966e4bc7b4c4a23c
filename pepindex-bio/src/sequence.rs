use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the protein database
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProteinEntry {
    /// Accession (first word of the FASTA header)
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

impl ProteinEntry {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn header(&self) -> String {
        match &self.description {
            Some(desc) => format!(">{} {}", self.id, desc),
            None => format!(">{}", self.id),
        }
    }

    /// Modification or annotation syntax embedded in the residue string
    /// (`PEPM(Oxidation)K`, `PEPC[+57]K`); such entries are not plain sequences.
    pub fn has_modification_syntax(&self) -> bool {
        self.sequence.iter().any(|&c| c == b'[' || c == b'(')
    }
}

impl fmt::Display for ProteinEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.sequence))
    }
}
