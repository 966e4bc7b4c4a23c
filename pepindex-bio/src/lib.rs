//! Protein-side building blocks for pepindex: residues, databases, enzymes
//! and identification records

pub mod alphabet;
pub mod corpus;
pub mod decoy;
pub mod digestion;
pub mod formats;
pub mod identification;
pub mod sequence;

// Re-export commonly used types
pub use corpus::{CorpusChunk, CorpusSource, VecCorpus};
pub use decoy::DecoyLabel;
pub use digestion::{Enzyme, ProteaseDigestion, ValidityPredicate};
pub use formats::fasta::{parse_fasta, parse_fasta_from_bytes, FastaChunkReader};
pub use identification::IdentificationDocument;
pub use sequence::ProteinEntry;
