#![allow(clippy::bool_assert_comparison)]

use std::fs;
/// Integration tests for configuration loading and saving
use pepindex_core::config::{default_config, load_config, save_config, IndexerConfig};
use pepindex_core::{DecoyPosition, MissingDecoyAction, PepIndexError, Specificity};
use tempfile::TempDir;

#[test]
fn test_config_loading_from_multiple_files() {
    let dir = TempDir::new().unwrap();

    let site_config = dir.path().join("site.toml");
    let project_config = dir.path().join("project.toml");

    let site_content = r#"
[search]
aaa_max = 2

[performance]
threads = 4
"#;
    fs::write(&site_config, site_content).unwrap();

    let project_content = r#"
[search]
aaa_max = 0
mismatches_max = 1
il_equivalent = true

[enzyme]
name = "Lys-C"
specificity = "semi"
allow_nterm_protein_cleavage = false

[decoy]
string = "_rev"
position = "suffix"

[policy]
missing_decoy_action = "warn"
"#;
    fs::write(&project_config, project_content).unwrap();

    let config1 = load_config(&site_config).unwrap();
    assert_eq!(config1.search.aaa_max, 2);
    assert_eq!(config1.search.mismatches_max, 0); // Default
    assert_eq!(config1.performance.threads, 4);

    let config2 = load_config(&project_config).unwrap();
    assert_eq!(config2.search.aaa_max, 0);
    assert_eq!(config2.search.mismatches_max, 1);
    assert_eq!(config2.search.il_equivalent, true);
    assert_eq!(config2.enzyme.name, "Lys-C");
    assert_eq!(config2.enzyme.specificity, Specificity::Semi);
    assert_eq!(config2.enzyme.allow_nterm_protein_cleavage, false);
    assert_eq!(config2.decoy.string, "_rev");
    assert_eq!(config2.decoy.position, DecoyPosition::Suffix);
    assert_eq!(config2.policy.missing_decoy_action, MissingDecoyAction::Warn);
}

#[test]
fn test_empty_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config, default_config());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load_config(dir.path().join("does-not-exist.toml"));
    assert!(matches!(result, Err(PepIndexError::Io(_))));
}

#[test]
fn test_malformed_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[search\naaa_max = three").unwrap();

    let result = load_config(&path);
    assert!(matches!(result, Err(PepIndexError::Configuration(_))));
}

#[test]
fn test_round_trip_preserves_every_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("full.toml");

    let mut config = IndexerConfig::default();
    config.search.il_equivalent = true;
    config.enzyme.specificity = Specificity::None;
    config.output.write_protein_description = true;
    config.output.keep_unreferenced_proteins = true;
    config.performance.chunk_size = 1000;

    save_config(&path, &config).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("[search]"));
    assert!(text.contains("il_equivalent = true"));

    let loaded = load_config(&path).unwrap();
    pretty_assertions::assert_eq!(loaded, config);
}
