//! Run status and exit codes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PepIndexError;

/// Final status of an indexing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitStatus {
    ExecutionOk,
    DatabaseEmpty,
    PeptideIdsEmpty,
    IllegalParameters,
    UnexpectedResult,
    DatabaseContainsMultiples,
}

impl ExitStatus {
    /// Process exit code used by the command line tool
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::ExecutionOk => 0,
            ExitStatus::IllegalParameters => 2,
            ExitStatus::DatabaseEmpty => 5,
            ExitStatus::PeptideIdsEmpty => 6,
            ExitStatus::DatabaseContainsMultiples => 7,
            ExitStatus::UnexpectedResult => 8,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ExitStatus::ExecutionOk)
    }
}

impl From<&PepIndexError> for ExitStatus {
    fn from(err: &PepIndexError) -> Self {
        match err {
            PepIndexError::EmptyCorpus => ExitStatus::DatabaseEmpty,
            PepIndexError::EmptyNeedleSet => ExitStatus::PeptideIdsEmpty,
            PepIndexError::DuplicateAccession { .. } => ExitStatus::DatabaseContainsMultiples,
            PepIndexError::IllegalParameters(_) | PepIndexError::Configuration(_) => {
                ExitStatus::IllegalParameters
            }
            _ => ExitStatus::UnexpectedResult,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitStatus::ExecutionOk => "execution ok",
            ExitStatus::DatabaseEmpty => "database empty",
            ExitStatus::PeptideIdsEmpty => "peptide identifications empty",
            ExitStatus::IllegalParameters => "illegal parameters",
            ExitStatus::UnexpectedResult => "unexpected result",
            ExitStatus::DatabaseContainsMultiples => "database contains multiples",
        };
        write!(f, "{}", name)
    }
}

/// A hard failure detected while scanning that does not prevent output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Protein entries carried modification or annotation syntax
    InvalidProteinContent { entries: usize },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::InvalidProteinContent { entries } => write!(
                f,
                "{} protein sequence(s) contain modification syntax ('[' or '(')",
                entries
            ),
        }
    }
}
