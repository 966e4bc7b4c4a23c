//! Policy and option enums shared by configuration and the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a peptide hit that maps to no protein
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum UnmatchedAction {
    /// Abort the run before any output is produced
    #[default]
    Error,
    /// Keep the hit, flagged as unmatched
    Warn,
    /// Drop the hit from its identification
    Remove,
}

/// What to do when not a single peptide hit maps to a decoy protein
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum MissingDecoyAction {
    #[default]
    Error,
    Warn,
    Silent,
}

/// How many termini of a peptide must agree with the enzyme's cleavage rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Specificity {
    /// Both termini
    #[default]
    Full,
    /// At least one terminus
    Semi,
    /// Any context is accepted
    None,
}

/// Where the decoy label sits in a protein accession
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DecoyPosition {
    #[default]
    Prefix,
    Suffix,
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specificity::Full => write!(f, "full"),
            Specificity::Semi => write!(f, "semi"),
            Specificity::None => write!(f, "none"),
        }
    }
}

impl fmt::Display for DecoyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoyPosition::Prefix => write!(f, "prefix"),
            DecoyPosition::Suffix => write!(f, "suffix"),
        }
    }
}
