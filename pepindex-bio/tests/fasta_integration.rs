use std::fs;
use std::io::Write;
/// Integration tests for FASTA parsing, writing and chunked reading
use pepindex_bio::corpus::CorpusSource;
use pepindex_bio::formats::fasta::{parse_fasta, write_fasta, FastaChunkReader};
use pepindex_bio::sequence::ProteinEntry;
use tempfile::{NamedTempFile, TempDir};

fn sample_entries() -> Vec<ProteinEntry> {
    vec![
        ProteinEntry::new("sp|P1|ONE".to_string(), b"MKWVTFISLLLLFSSAYSRGVFRR".to_vec())
            .with_description("First protein".to_string()),
        ProteinEntry::new("DECOY_sp|P1|ONE".to_string(), b"RRFVGRSYASSFLLLLSIFTVWKM".to_vec()),
        ProteinEntry::new("P3".to_string(), "ACDEFGHIKLMNPQRSTVWY".repeat(7).into_bytes())
            .with_description("Long protein wrapped over several lines".to_string()),
    ]
}

#[test]
fn test_fasta_round_trip() {
    let entries = sample_entries();

    let temp_file = NamedTempFile::new().unwrap();
    write_fasta(temp_file.path(), &entries).unwrap();

    let parsed = parse_fasta(temp_file.path()).unwrap();
    pretty_assertions::assert_eq!(parsed, entries);
}

#[test]
fn test_gzip_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.fasta.gz");
    let entries = sample_entries();

    write_fasta(&path, &entries).unwrap();
    assert_eq!(parse_fasta(&path).unwrap(), entries);

    let mut reader = FastaChunkReader::open(&path).unwrap();
    let chunk = reader.cache_next(10).unwrap();
    assert_eq!(chunk.entries(), &entries[..]);
}

#[test]
fn test_chunked_reading_of_large_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    for i in 0..1000 {
        writeln!(temp_file, ">prot_{} Test protein {}", i, i).unwrap();
        writeln!(temp_file, "MKWVTFISLL").unwrap();
        writeln!(temp_file, "LLFSSAYSRK").unwrap();
    }
    temp_file.flush().unwrap();

    let whole = parse_fasta(temp_file.path()).unwrap();
    assert_eq!(whole.len(), 1000);

    let mut reader = FastaChunkReader::open(temp_file.path()).unwrap();
    let mut offsets = Vec::new();
    let mut streamed = Vec::new();
    loop {
        let chunk = reader.cache_next(300).unwrap();
        if chunk.is_empty() {
            break;
        }
        assert!(chunk.size() <= 300);
        offsets.push(chunk.offset());
        streamed.extend(chunk.into_entries());
    }

    assert_eq!(offsets, vec![0, 300, 600, 900]);
    assert_eq!(streamed, whole);
    assert_eq!(streamed[999].id, "prot_999");
    assert_eq!(streamed[999].sequence, b"MKWVTFISLLLLFSSAYSRK");
}

#[test]
fn test_malformed_fasta_handling() {
    let long_seq = format!(">seq1\n{}\n", "A".repeat(100000));
    let test_cases = vec![
        // Missing '>' at start
        ("seq1\nMKWV\n", 0),
        // Empty file
        ("", 0),
        // Only headers, no sequences
        (">seq1\n>seq2\n>seq3\n", 0),
        // Blank lines between records
        ("\n>seq1\nMKWV\n\n\n>seq2\nPEPT\n\n", 2),
        // Very long lines
        (long_seq.as_str(), 1),
    ];

    for (content, expected_count) in test_cases {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("case.fasta");
        fs::write(&path, content).unwrap();

        let parsed = parse_fasta(&path).unwrap();
        assert_eq!(parsed.len(), expected_count, "case {:?}", &content[..content.len().min(30)]);

        let mut reader = FastaChunkReader::open(&path).unwrap();
        assert_eq!(reader.cache_next(usize::MAX).unwrap().size(), expected_count);
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.fasta");
    assert!(matches!(
        parse_fasta(&missing),
        Err(pepindex_core::PepIndexError::Io(_))
    ));
    assert!(FastaChunkReader::open(&missing).is_err());
}
