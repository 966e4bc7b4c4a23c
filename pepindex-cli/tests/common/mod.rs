#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working directory for one test
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// The pepindex binary with the progress spinner disabled
pub fn pepindex_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pepindex").unwrap();
    cmd.env("PEPINDEX_SILENT", "1").env_remove("RUST_LOG");
    cmd
}

/// Two target proteins and the reversed decoy of the first
pub fn create_protein_fasta() -> String {
    r#">sp|P1|ALPHA first protein
MKAEPTIDERAAKLLK
>sp|P2|BETA second protein
GGGKAEPTIDEKWWR
>DECOY_sp|P1|ALPHA
KLLKAAREDITPEAKM
"#
    .to_string()
}

/// Identification document with the given peptide sequences in one run
pub fn create_identifications(sequences: &[&str]) -> String {
    let hits: Vec<String> = sequences
        .iter()
        .map(|s| format!(r#"{{ "sequence": "{}" }}"#, s))
        .collect();
    format!(
        r#"{{
  "proteins": [ {{ "identifier": "run_1", "hits": [] }} ],
  "peptides": [ {{ "identifier": "run_1", "hits": [ {} ] }} ]
}}"#,
        hits.join(", ")
    )
}

pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
