pub mod config;
pub mod index;

use pepindex_core::{load_config, IndexerConfig};
use std::path::Path;

/// Configuration from `path`, or the defaults
pub fn base_config(path: Option<&Path>) -> anyhow::Result<IndexerConfig> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(IndexerConfig::default()),
    }
}
