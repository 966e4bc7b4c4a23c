use crate::corpus::{CorpusChunk, CorpusSource};
use crate::sequence::ProteinEntry;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending, space1},
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};
use pepindex_core::error::PepIndexError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Parse a FASTA header line without its line ending
fn parse_header_line(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        space1,
        map(not_line_ending, |s| std::str::from_utf8(s).unwrap_or("")),
    ))(input)?;
    Ok((input, (id, description.map(str::trim).filter(|d| !d.is_empty()))))
}

/// Parse a FASTA header line including its line ending
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, header) = parse_header_line(input)?;
    let (input, _) = opt(line_ending)(input)?;
    Ok((input, header))
}

/// Append residues of one sequence line, dropping whitespace
fn push_residues(sequence: &mut Vec<u8>, line: &[u8]) {
    sequence.extend(
        line.iter()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase()),
    );
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (mut rest, ending) = opt(line_ending)(rest)?;
        if line.is_empty() && ending.is_none() {
            // stray carriage return
            rest = &rest[1..];
        }
        push_residues(&mut sequence, line);
        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], ProteinEntry> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    let mut entry = ProteinEntry::new(id.to_string(), sequence);
    if let Some(desc) = description {
        entry = entry.with_description(desc.to_string());
    }
    Ok((input, entry))
}

/// Parse FASTA from bytes
///
/// Records without residues are skipped. Text before the first header is
/// ignored.
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<ProteinEntry>, PepIndexError> {
    let mut entries = Vec::new();
    let mut input = data;

    // skip anything before the first header
    while !input.is_empty() && input[0] != b'>' {
        match input.iter().position(|&c| c == b'\n') {
            Some(pos) => input = &input[pos + 1..],
            None => input = &[],
        }
    }

    while !input.is_empty() {
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        match parse_record(input) {
            Ok((remaining, entry)) => {
                if !entry.is_empty() {
                    entries.push(entry);
                }
                input = remaining;
            }
            Err(e) => {
                return Err(PepIndexError::Parse(format!(
                    "Failed to parse FASTA: {:?}",
                    e
                )));
            }
        }
    }

    Ok(entries)
}

/// Parse a FASTA file into protein entries (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<ProteinEntry>, PepIndexError> {
    let path = path.as_ref();

    if is_gzipped(path) {
        let file = File::open(path)?;
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut buffer = Vec::new();
        decoder.read_to_end(&mut buffer)?;
        parse_fasta_from_bytes(&buffer)
    } else {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }
        let mmap = unsafe { Mmap::map(&file)? };
        parse_fasta_from_bytes(&mmap[..])
    }
}

/// Residues per line when writing FASTA
const LINE_WIDTH: usize = 60;

/// Write protein entries to a FASTA file (gzip-compressed when the path ends in `.gz`)
pub fn write_fasta<P: AsRef<Path>>(path: P, entries: &[ProteinEntry]) -> Result<(), PepIndexError> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let path = path.as_ref();
    let file = File::create(path)?;

    if is_gzipped(path) {
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = BufWriter::new(encoder);
        write_fasta_to_writer(&mut writer, entries)?;
        writer.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_fasta_to_writer(&mut writer, entries)?;
        writer.flush()?;
    }

    Ok(())
}

fn write_fasta_to_writer<W: Write>(writer: &mut W, entries: &[ProteinEntry]) -> Result<(), PepIndexError> {
    for entry in entries {
        writeln!(writer, "{}", entry.header())?;
        for line in entry.sequence.chunks(LINE_WIDTH) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// Trait representing the capability to read FASTA files with automatic compression detection
pub trait FastaReadable {
    /// Open a FASTA file for reading, automatically detecting compression
    fn open_for_reading<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>, PepIndexError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        if is_gzipped(path) {
            Ok(Box::new(BufReader::new(GzDecoder::new(file))))
        } else {
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Zero-sized type that implements FastaReadable
pub struct FastaFile;

impl FastaReadable for FastaFile {}

/// Streaming FASTA cursor that hands out the database a chunk at a time
///
/// Only the entries of the chunk being returned are held in memory, so the
/// resident size is bounded by the requested chunk size rather than by the
/// size of the file.
pub struct FastaChunkReader {
    reader: Box<dyn BufRead + Send>,
    /// Header read ahead of the current record
    pending: Option<(String, Option<String>)>,
    line: Vec<u8>,
    entries_read: usize,
    exhausted: bool,
}

impl FastaChunkReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PepIndexError> {
        Ok(Self::from_reader(FastaFile::open_for_reading(path)?))
    }

    pub fn from_reader(reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            reader,
            pending: None,
            line: Vec::new(),
            entries_read: 0,
            exhausted: false,
        }
    }

    /// Read the next line into the scratch buffer, without its line ending.
    /// Returns false at EOF.
    fn next_line(&mut self) -> Result<bool, PepIndexError> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        while matches!(self.line.last(), Some(b'\n') | Some(b'\r')) {
            self.line.pop();
        }
        Ok(true)
    }

    fn take_header(&self) -> Result<(String, Option<String>), PepIndexError> {
        let (_, (id, description)) = parse_header_line(&self.line).map_err(|e| {
            PepIndexError::Parse(format!("Failed to parse FASTA header: {:?}", e))
        })?;
        Ok((id.to_string(), description.map(str::to_string)))
    }

    /// Read the next non-empty record, `None` at EOF.
    fn next_entry(&mut self) -> Result<Option<ProteinEntry>, PepIndexError> {
        loop {
            if self.pending.is_none() {
                // scan forward to the first header
                loop {
                    if !self.next_line()? {
                        self.exhausted = true;
                        return Ok(None);
                    }
                    if self.line.first() == Some(&b'>') {
                        self.pending = Some(self.take_header()?);
                        break;
                    }
                }
            }

            let (id, description) = match self.pending.take() {
                Some(header) => header,
                None => return Ok(None),
            };
            let mut sequence = Vec::new();

            while self.next_line()? {
                if self.line.first() == Some(&b'>') {
                    self.pending = Some(self.take_header()?);
                    break;
                }
                push_residues(&mut sequence, &self.line);
            }

            if sequence.is_empty() {
                if self.pending.is_none() {
                    self.exhausted = true;
                    return Ok(None);
                }
                continue;
            }

            let mut entry = ProteinEntry::new(id, sequence);
            if let Some(desc) = description {
                entry = entry.with_description(desc);
            }
            return Ok(Some(entry));
        }
    }
}

impl CorpusSource for FastaChunkReader {
    fn cache_next(&mut self, max_entries: usize) -> Result<CorpusChunk, PepIndexError> {
        let offset = self.entries_read;
        let mut entries = Vec::with_capacity(max_entries.min(1 << 16));

        while entries.len() < max_entries && !self.exhausted {
            match self.next_entry()? {
                Some(entry) => entries.push(entry),
                None => break,
            }
        }

        self.entries_read += entries.len();
        Ok(CorpusChunk::new(offset, entries))
    }

    fn entries_read(&self) -> usize {
        self.entries_read
    }
}
