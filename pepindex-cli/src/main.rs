use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use pepindex_core::{ExitStatus, PepIndexError};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(exit_code(&e));
        }
    }
}

/// RUST_LOG wins, then PEPINDEX_LOG, then the -v level.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => std::env::var("PEPINDEX_LOG").unwrap_or_else(|_| "warn".to_string()),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback)))
        .init();
}

fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<PepIndexError>() {
        Some(PepIndexError::Io(_)) => 3,
        Some(PepIndexError::Parse(_)) | Some(PepIndexError::Serialization(_)) => 4,
        Some(err) => ExitStatus::from(err).code(),
        None => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Index(mut args) => {
            args.threads = cli.threads;
            crate::cli::commands::index::run(args)
        }
        Commands::Config(args) => crate::cli::commands::config::run(args).map(|_| 0),
    }
}
