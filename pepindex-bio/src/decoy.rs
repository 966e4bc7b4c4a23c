use pepindex_core::DecoyPosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accession tag marking the decoy part of a database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoyLabel {
    pub label: String,
    pub position: DecoyPosition,
}

impl DecoyLabel {
    pub fn new(label: impl Into<String>, position: DecoyPosition) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }

    pub fn is_decoy(&self, accession: &str) -> bool {
        match self.position {
            DecoyPosition::Prefix => accession.starts_with(&self.label),
            DecoyPosition::Suffix => accession.ends_with(&self.label),
        }
    }
}

impl Default for DecoyLabel {
    fn default() -> Self {
        Self::new("DECOY_", DecoyPosition::Prefix)
    }
}

impl fmt::Display for DecoyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.label, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_suffix() {
        let prefix = DecoyLabel::default();
        assert!(prefix.is_decoy("DECOY_P12345"));
        assert!(!prefix.is_decoy("P12345_DECOY_"));

        let suffix = DecoyLabel::new("_rev", DecoyPosition::Suffix);
        assert!(suffix.is_decoy("P12345_rev"));
        assert!(!suffix.is_decoy("rev_P12345"));
        assert_eq!(suffix.to_string(), "'_rev' (suffix)");
    }
}
