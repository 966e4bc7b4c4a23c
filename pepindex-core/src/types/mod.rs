//! Shared types for pepindex crates

pub mod policy;
pub mod stats;
pub mod status;

pub use policy::{DecoyPosition, MissingDecoyAction, Specificity, UnmatchedAction};
pub use stats::IndexStats;
pub use status::{ExitStatus, FailureReason};
