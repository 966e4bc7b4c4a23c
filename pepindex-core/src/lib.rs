//! Core utilities and types shared across all pepindex crates

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, IndexerConfig};
pub use error::{PepIndexError, PepIndexResult};

pub use types::{
    DecoyPosition, ExitStatus, FailureReason, IndexStats, MissingDecoyAction, Specificity,
    UnmatchedAction,
};

/// Version information for the pepindex project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
