//! Configuration types for pepindex

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{DecoyPosition, MissingDecoyAction, Specificity, UnmatchedAction};
use crate::PepIndexError;

/// Largest accepted value for either substitution budget
pub const MAX_SUBSTITUTION_BUDGET: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IndexerConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub enzyme: EnzymeConfig,
    #[serde(default)]
    pub decoy: DecoyConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Ambiguous residues (B, J, Z, X) allowed per match
    #[serde(default = "default_aaa_max")]
    pub aaa_max: usize,
    /// Literal mismatches allowed per match
    #[serde(default)]
    pub mismatches_max: usize,
    /// Treat I and L as the same residue
    #[serde(default)]
    pub il_equivalent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnzymeConfig {
    #[serde(default = "default_enzyme_name")]
    pub name: String,
    #[serde(default)]
    pub specificity: Specificity,
    /// Accept peptides starting right after an initial methionine
    #[serde(default = "default_true")]
    pub allow_nterm_protein_cleavage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecoyConfig {
    #[serde(default = "default_decoy_string")]
    pub string: String,
    #[serde(default)]
    pub position: DecoyPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PolicyConfig {
    #[serde(default)]
    pub unmatched_action: UnmatchedAction,
    #[serde(default)]
    pub missing_decoy_action: MissingDecoyAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub write_protein_sequence: bool,
    #[serde(default)]
    pub write_protein_description: bool,
    #[serde(default)]
    pub keep_unreferenced_proteins: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceConfig {
    /// Worker threads (0 = all available cores)
    #[serde(default)]
    pub threads: usize,
    /// Protein entries resident per corpus chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Entries handed to a worker at a time
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

// Default value functions
fn default_aaa_max() -> usize { 3 }
fn default_enzyme_name() -> String { "Trypsin".to_string() }
fn default_true() -> bool { true }
fn default_decoy_string() -> String { "DECOY_".to_string() }
fn default_chunk_size() -> usize { 400_000 }
fn default_batch_size() -> usize { 100 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            aaa_max: default_aaa_max(),
            mismatches_max: 0,
            il_equivalent: false,
        }
    }
}

impl Default for EnzymeConfig {
    fn default() -> Self {
        Self {
            name: default_enzyme_name(),
            specificity: Specificity::default(),
            allow_nterm_protein_cleavage: default_true(),
        }
    }
}

impl Default for DecoyConfig {
    fn default() -> Self {
        Self {
            string: default_decoy_string(),
            position: DecoyPosition::default(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            chunk_size: default_chunk_size(),
            batch_size: default_batch_size(),
        }
    }
}

impl IndexerConfig {
    /// Check the parameter ranges that do not depend on the enzyme table.
    pub fn validate(&self) -> Result<(), PepIndexError> {
        if self.search.aaa_max > MAX_SUBSTITUTION_BUDGET {
            return Err(PepIndexError::IllegalParameters(format!(
                "aaa_max must be at most {} (got {})",
                MAX_SUBSTITUTION_BUDGET, self.search.aaa_max
            )));
        }
        if self.search.mismatches_max > MAX_SUBSTITUTION_BUDGET {
            return Err(PepIndexError::IllegalParameters(format!(
                "mismatches_max must be at most {} (got {})",
                MAX_SUBSTITUTION_BUDGET, self.search.mismatches_max
            )));
        }
        if self.performance.chunk_size == 0 {
            return Err(PepIndexError::IllegalParameters(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.performance.batch_size == 0 {
            return Err(PepIndexError::IllegalParameters(
                "batch_size must be positive".to_string(),
            ));
        }
        if self.decoy.string.is_empty() {
            return Err(PepIndexError::IllegalParameters(
                "decoy string must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Combined substitution budget of one match
    pub fn substitution_budget(&self) -> usize {
        self.search.aaa_max + self.search.mismatches_max
    }
}

pub fn default_config() -> IndexerConfig {
    IndexerConfig::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<IndexerConfig, PepIndexError> {
    let contents = std::fs::read_to_string(path)?;
    let config: IndexerConfig = toml::from_str(&contents)?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &IndexerConfig) -> Result<(), PepIndexError> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
