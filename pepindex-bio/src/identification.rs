//! Identification records: peptide queries and the protein runs they refer to
//!
//! A document holds any number of protein identification runs and the
//! peptide identifications of those runs. Each peptide identification names
//! its run through `identifier`. The indexer fills in evidences and
//! target/decoy annotations on the peptide side and rewrites the protein hit
//! lists on the run side.

use pepindex_core::PepIndexResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Which part of the database a hit was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetDecoy {
    #[serde(rename = "target")]
    Target,
    #[serde(rename = "decoy")]
    Decoy,
    #[serde(rename = "target+decoy")]
    TargetDecoy,
}

impl TargetDecoy {
    pub fn from_flags(target: bool, decoy: bool) -> Option<Self> {
        match (target, decoy) {
            (true, true) => Some(TargetDecoy::TargetDecoy),
            (true, false) => Some(TargetDecoy::Target),
            (false, true) => Some(TargetDecoy::Decoy),
            (false, false) => None,
        }
    }
}

impl fmt::Display for TargetDecoy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDecoy::Target => write!(f, "target"),
            TargetDecoy::Decoy => write!(f, "decoy"),
            TargetDecoy::TargetDecoy => write!(f, "target+decoy"),
        }
    }
}

/// Number of distinct proteins a peptide maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProteinReferences {
    Unique,
    NonUnique,
    Unmatched,
}

impl ProteinReferences {
    pub fn from_count(distinct_proteins: usize) -> Self {
        match distinct_proteins {
            0 => ProteinReferences::Unmatched,
            1 => ProteinReferences::Unique,
            _ => ProteinReferences::NonUnique,
        }
    }
}

/// Location of a peptide in one protein
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeptideEvidence {
    pub accession: String,
    /// 0-based offset of the first residue
    pub start: usize,
    /// 0-based offset of the last residue
    pub end: usize,
    pub aa_before: char,
    pub aa_after: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeptideHit {
    /// Sequence as reported, possibly with modification annotations
    pub sequence: String,
    #[serde(default)]
    pub evidences: Vec<PeptideEvidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_decoy: Option<TargetDecoy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_references: Option<ProteinReferences>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl PeptideHit {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            evidences: Vec::new(),
            target_decoy: None,
            protein_references: None,
            meta: BTreeMap::new(),
        }
    }

    pub fn unmodified_sequence(&self) -> String {
        unmodified_sequence(&self.sequence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeptideIdentification {
    /// Identifier of the protein run these hits belong to
    pub identifier: String,
    #[serde(default)]
    pub hits: Vec<PeptideHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinHit {
    pub accession: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_decoy: Option<TargetDecoy>,
}

impl ProteinHit {
    pub fn new(accession: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            sequence: None,
            description: None,
            target_decoy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinIdentification {
    pub identifier: String,
    #[serde(default)]
    pub hits: Vec<ProteinHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentificationDocument {
    #[serde(default)]
    pub proteins: Vec<ProteinIdentification>,
    #[serde(default)]
    pub peptides: Vec<PeptideIdentification>,
}

impl IdentificationDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> PepIndexResult<Self> {
        let file = File::open(path)?;
        let document = serde_json::from_reader(BufReader::new(file))?;
        Ok(document)
    }

    pub fn store<P: AsRef<Path>>(&self, path: P) -> PepIndexResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_json(text: &str) -> PepIndexResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> PepIndexResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of peptide hits over all identifications
    pub fn peptide_hit_count(&self) -> usize {
        self.peptides.iter().map(|p| p.hits.len()).sum()
    }
}

/// Residue letters of an annotated peptide sequence
///
/// Bracketed or parenthesized annotations (nested ones included) and every
/// non-letter are dropped, the rest is uppercased: `.(Acetyl)PEPM(Oxidation)K`
/// becomes `PEPMK`.
pub fn unmodified_sequence(annotated: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(annotated.len());
    for c in annotated.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && c.is_ascii_alphabetic() => out.push(c.to_ascii_uppercase()),
            _ => {}
        }
    }
    out
}
