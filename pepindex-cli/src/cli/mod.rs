pub mod commands;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pepindex",
    version,
    about = "Map peptide identifications to the proteins of a FASTA database",
    long_about = "pepindex finds every protein that contains each identified peptide, \
                  tolerating ambiguous residues and mismatches, checks the enzyme cleavage \
                  context and annotates peptides and proteins as target or decoy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index peptide identifications against a protein database
    Index(commands::index::IndexArgs),

    /// Print the effective configuration as TOML
    Config(commands::config::ConfigArgs),
}
