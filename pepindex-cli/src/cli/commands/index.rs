use clap::Args;
use pepindex_bio::formats::fasta::FastaChunkReader;
use pepindex_bio::identification::IdentificationDocument;
use pepindex_engine::PeptideIndexer;
use std::path::PathBuf;
use tracing::info;

use super::config::ConfigOverrides;
use crate::cli::output::{print_report, success};
use crate::cli::progress::scan_progress;

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Protein database (FASTA, optionally gzip compressed)
    #[arg(short = 'd', long, value_name = "FILE")]
    pub fasta: PathBuf,

    /// Identification document to annotate (JSON)
    #[arg(short = 'i', long = "in", value_name = "FILE")]
    pub input: PathBuf,

    /// Annotated identification document (JSON)
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub output: PathBuf,

    /// Do not print the summary tables
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub settings: ConfigOverrides,

    /// Number of threads (passed from global)
    #[arg(skip)]
    pub threads: Option<usize>,
}

/// Run the indexer and return the process exit code.
pub fn run(args: IndexArgs) -> anyhow::Result<i32> {
    let config = args.settings.resolve(args.threads)?;
    let indexer = PeptideIndexer::new(config)?;

    let mut document = IdentificationDocument::load(&args.input)?;
    info!(
        "Loaded {} peptide hit(s) from {}",
        document.peptide_hit_count(),
        args.input.display()
    );
    let mut reader = FastaChunkReader::open(&args.fasta)?;

    let progress = scan_progress();
    let result = indexer.run(&mut document, &mut reader, Some(&progress));
    progress.finish_and_clear();
    let report = result?;

    document.store(&args.output)?;

    if !args.quiet {
        print_report(&report);
        success(&format!("Annotated identifications written to {}", args.output.display()));
    }
    Ok(report.status.code())
}
