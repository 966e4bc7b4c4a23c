pub mod fasta;

// Re-export commonly used functions
pub use fasta::{parse_fasta, parse_fasta_from_bytes, write_fasta};
pub use fasta::{FastaChunkReader, FastaFile, FastaReadable};
