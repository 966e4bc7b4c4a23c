use clap::Args;
use pepindex_core::{
    save_config, DecoyPosition, IndexerConfig, MissingDecoyAction, Specificity, UnmatchedAction,
};
use std::path::PathBuf;

use super::base_config;
use crate::cli::output::success;

/// Command line settings that take precedence over the configuration file
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Configuration file (TOML)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ambiguous residues (B, J, Z, X) allowed per match
    #[arg(long, value_name = "N")]
    pub aaa_max: Option<usize>,

    /// Mismatching residues allowed per match
    #[arg(long, value_name = "N")]
    pub mismatches_max: Option<usize>,

    /// Treat I and L (and J) as the same residue
    #[arg(long)]
    pub il_equivalent: bool,

    /// Enzyme name (e.g. "Trypsin", "Lys-C", "unspecific cleavage")
    #[arg(short = 'e', long, value_name = "NAME")]
    pub enzyme: Option<String>,

    /// Termini that must follow the enzyme's cleavage rule
    #[arg(long, value_enum)]
    pub specificity: Option<Specificity>,

    /// Reject peptides that start after an initial methionine
    #[arg(long)]
    pub no_nterm_protein_cleavage: bool,

    /// Label marking decoy protein accessions
    #[arg(long, value_name = "LABEL")]
    pub decoy_string: Option<String>,

    /// Where the decoy label sits in the accession
    #[arg(long, value_enum)]
    pub decoy_position: Option<DecoyPosition>,

    /// What to do with peptides that match no protein
    #[arg(long, value_enum)]
    pub unmatched_action: Option<UnmatchedAction>,

    /// What to do when no peptide matches a decoy protein
    #[arg(long, value_enum)]
    pub missing_decoy_action: Option<MissingDecoyAction>,

    /// Store protein sequences in the protein hits
    #[arg(long)]
    pub write_protein_sequence: bool,

    /// Store protein descriptions in the protein hits
    #[arg(long)]
    pub write_protein_description: bool,

    /// Keep protein hits no peptide refers to any more
    #[arg(long)]
    pub keep_unreferenced_proteins: bool,

    /// Protein entries held in memory per chunk
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Protein entries per parallel task
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
}

impl ConfigOverrides {
    /// Load the configuration file (if any) and apply the flags on top.
    pub fn resolve(&self, threads: Option<usize>) -> anyhow::Result<IndexerConfig> {
        let mut config = base_config(self.config.as_deref())?;
        self.apply(&mut config);
        if let Some(threads) = threads {
            config.performance.threads = threads;
        }
        Ok(config)
    }

    pub fn apply(&self, config: &mut IndexerConfig) {
        if let Some(n) = self.aaa_max {
            config.search.aaa_max = n;
        }
        if let Some(n) = self.mismatches_max {
            config.search.mismatches_max = n;
        }
        if self.il_equivalent {
            config.search.il_equivalent = true;
        }
        if let Some(name) = &self.enzyme {
            config.enzyme.name = name.clone();
        }
        if let Some(specificity) = self.specificity {
            config.enzyme.specificity = specificity;
        }
        if self.no_nterm_protein_cleavage {
            config.enzyme.allow_nterm_protein_cleavage = false;
        }
        if let Some(label) = &self.decoy_string {
            config.decoy.string = label.clone();
        }
        if let Some(position) = self.decoy_position {
            config.decoy.position = position;
        }
        if let Some(action) = self.unmatched_action {
            config.policy.unmatched_action = action;
        }
        if let Some(action) = self.missing_decoy_action {
            config.policy.missing_decoy_action = action;
        }
        if self.write_protein_sequence {
            config.output.write_protein_sequence = true;
        }
        if self.write_protein_description {
            config.output.write_protein_description = true;
        }
        if self.keep_unreferenced_proteins {
            config.output.keep_unreferenced_proteins = true;
        }
        if let Some(n) = self.chunk_size {
            config.performance.chunk_size = n;
        }
        if let Some(n) = self.batch_size {
            config.performance.batch_size = n;
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub settings: ConfigOverrides,

    /// Write the configuration to this file instead of printing it
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = args.settings.resolve(None)?;
    config.validate()?;

    match args.output {
        Some(path) => {
            save_config(&path, &config)?;
            success(&format!("Configuration written to {}", path.display()));
        }
        None => print!("{}", toml::to_string_pretty(&config)?),
    }
    Ok(())
}
