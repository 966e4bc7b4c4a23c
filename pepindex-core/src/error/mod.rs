//! Core error types for pepindex

use thiserror::Error;

/// Main error type for indexing runs
///
/// Variants up to `Other` are the usual plumbing failures. The remaining
/// variants are the fatal outcomes of an indexing run: they are raised before
/// any identification record is rewritten, so a caller that receives one of
/// them has no partial output to clean up.
#[derive(Error, Debug)]
pub enum PepIndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Illegal parameters: {0}")]
    IllegalParameters(String),

    #[error("Empty needle set: no peptide sequences to index")]
    EmptyNeedleSet,

    #[error("Empty database: the protein database contains no entries")]
    EmptyCorpus,

    #[error("Protein identifier '{accession}' found multiple times with different sequences")]
    DuplicateAccession { accession: String },

    #[error("{count} peptide sequence(s) could not be matched to any protein")]
    UnmatchedPeptides { count: usize },

    #[error("No peptides were matched to the decoy portion of the database (decoy string '{label}', {position})")]
    MissingDecoys { label: String, position: String },

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for pepindex operations
pub type PepIndexResult<T> = Result<T, PepIndexError>;

impl PepIndexError {
    /// True for the errors that stem from the caller's parameters or inputs
    /// rather than from the data found while scanning.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PepIndexError::Configuration(_)
                | PepIndexError::IllegalParameters(_)
                | PepIndexError::EmptyNeedleSet
                | PepIndexError::EmptyCorpus
        )
    }
}

impl From<serde_json::Error> for PepIndexError {
    fn from(err: serde_json::Error) -> Self {
        PepIndexError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PepIndexError {
    fn from(err: toml::de::Error) -> Self {
        PepIndexError::Configuration(format!("Failed to parse config: {}", err))
    }
}

impl From<toml::ser::Error> for PepIndexError {
    fn from(err: toml::ser::Error) -> Self {
        PepIndexError::Configuration(format!("Failed to serialize config: {}", err))
    }
}

impl From<anyhow::Error> for PepIndexError {
    fn from(err: anyhow::Error) -> Self {
        PepIndexError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = PepIndexError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let config_error = PepIndexError::Configuration("missing field".to_string());
        assert_eq!(format!("{}", config_error), "Configuration error: missing field");

        let params = PepIndexError::IllegalParameters("aaa_max > 10".to_string());
        assert_eq!(format!("{}", params), "Illegal parameters: aaa_max > 10");

        let dup = PepIndexError::DuplicateAccession {
            accession: "P01234".to_string(),
        };
        assert!(format!("{}", dup).contains("'P01234'"));

        let unmatched = PepIndexError::UnmatchedPeptides { count: 3 };
        assert_eq!(
            format!("{}", unmatched),
            "3 peptide sequence(s) could not be matched to any protein"
        );

        let decoys = PepIndexError::MissingDecoys {
            label: "DECOY_".to_string(),
            position: "prefix".to_string(),
        };
        assert!(format!("{}", decoys).contains("DECOY_"));
        assert!(format!("{}", decoys).contains("prefix"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: PepIndexError = io_err.into();

        match err {
            PepIndexError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");
        let err: PepIndexError = parse_result.unwrap_err().into();

        match err {
            PepIndexError::Serialization(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_toml_error_conversion() {
        let parsed: Result<toml::Value, toml::de::Error> = toml::from_str("[search\naaa_max = ");
        let err: PepIndexError = parsed.unwrap_err().into();
        assert!(matches!(err, PepIndexError::Configuration(_)));
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: PepIndexError = anyhow::anyhow!("custom error message").into();
        match err {
            PepIndexError::Other(msg) => assert_eq!(msg, "custom error message"),
            _ => panic!("Expected Other error variant"),
        }
    }

    #[test]
    fn test_configuration_classification() {
        assert!(PepIndexError::EmptyNeedleSet.is_configuration());
        assert!(PepIndexError::EmptyCorpus.is_configuration());
        assert!(PepIndexError::IllegalParameters("x".into()).is_configuration());
        assert!(!PepIndexError::UnmatchedPeptides { count: 1 }.is_configuration());
        assert!(!PepIndexError::DuplicateAccession { accession: "A".into() }.is_configuration());
    }
}
