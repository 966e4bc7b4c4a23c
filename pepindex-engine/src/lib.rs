//! Peptide-to-protein indexing engine
//!
//! Builds a substitution-tolerant Aho-Corasick automaton from the peptide
//! hits of an identification document, streams a protein database through
//! it in parallel and writes the resulting evidences back.

pub mod accumulator;
pub mod automaton;
pub mod driver;
pub mod evidence;
pub mod indexer;
pub mod needles;

pub use accumulator::{Accumulator, MatchRecord};
pub use automaton::{Automaton, Hit, MatchState, SearchBudget, TrieBuilder};
pub use driver::{AccessionTable, CorpusDriver, DriverOptions, ReferencedEntry, ScanResult};
pub use evidence::{EvidenceAssembler, EvidenceOptions};
pub use indexer::{IndexingReport, PeptideIndexer};
pub use needles::NeedleSet;
