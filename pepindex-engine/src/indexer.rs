//! Top-level peptide indexing run

use indicatif::ProgressBar;
use pepindex_bio::corpus::CorpusSource;
use pepindex_bio::decoy::DecoyLabel;
use pepindex_bio::digestion::ProteaseDigestion;
use pepindex_bio::identification::IdentificationDocument;
use pepindex_core::{
    ExitStatus, FailureReason, IndexStats, IndexerConfig, PepIndexError, PepIndexResult,
};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::automaton::{Automaton, SearchBudget};
use crate::driver::{CorpusDriver, DriverOptions};
use crate::evidence::{EvidenceAssembler, EvidenceOptions};
use crate::needles::NeedleSet;

/// Outcome of a run that produced output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexingReport {
    pub stats: IndexStats,
    pub status: ExitStatus,
    /// Hard failures found while scanning; output was still produced
    pub failures: Vec<FailureReason>,
}

impl IndexingReport {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Maps the peptide hits of an identification document onto a protein
/// database
pub struct PeptideIndexer {
    config: IndexerConfig,
    digestion: ProteaseDigestion,
    budget: SearchBudget,
    evidence: EvidenceOptions,
}

impl PeptideIndexer {
    /// Validate `config` completely and prepare the run.
    pub fn new(config: IndexerConfig) -> PepIndexResult<Self> {
        config.validate()?;

        let digestion = ProteaseDigestion::new(&config.enzyme.name, config.enzyme.specificity)?;
        if config.search.il_equivalent && digestion.enzyme().conflicts_with_il_folding() {
            return Err(PepIndexError::IllegalParameters(format!(
                "enzyme '{}' cleaves at only one of I and L, which conflicts with il_equivalent",
                digestion.enzyme().name
            )));
        }

        let budget = SearchBudget::new(config.search.aaa_max, config.search.mismatches_max)?;
        let evidence = EvidenceOptions::from_config(&config);

        Ok(Self {
            config,
            digestion,
            budget,
            evidence,
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn decoy(&self) -> &DecoyLabel {
        &self.evidence.decoy
    }

    /// Index every peptide hit of `document` against `corpus`.
    ///
    /// On error the document is left as loaded. A returned report may still
    /// carry a failing status when the database held invalid content.
    pub fn run(
        &self,
        document: &mut IdentificationDocument,
        corpus: &mut dyn CorpusSource,
        progress: Option<&ProgressBar>,
    ) -> PepIndexResult<IndexingReport> {
        let started = Instant::now();

        let needles = NeedleSet::from_document(document, self.config.search.il_equivalent)?;
        if needles.is_empty() {
            return Err(PepIndexError::EmptyNeedleSet);
        }
        info!(
            "Indexing {} peptide hit(s) ({} distinct sequences)",
            needles.query_count(),
            needles.len()
        );

        let automaton = Automaton::build(needles.iter(), self.budget)?;
        debug!(
            "Automaton built: {} nodes, shortest needle {}, budget aaa={} mm={}",
            automaton.node_count(),
            automaton.min_needle_len(),
            self.budget.aaa(),
            self.budget.mismatches()
        );

        let options = DriverOptions {
            threads: self.config.performance.threads,
            chunk_size: self.config.performance.chunk_size,
            batch_size: self.config.performance.batch_size,
            il_equivalent: self.config.search.il_equivalent,
            allow_nterm_protein_cleavage: self.config.enzyme.allow_nterm_protein_cleavage,
            keep_sequence: self.config.output.write_protein_sequence,
            keep_description: self.config.output.write_protein_description,
        };
        let driver = CorpusDriver::new(&automaton, &self.digestion, &self.evidence.decoy, options)?;
        debug!("Scanning database with {} thread(s)", driver.threads());
        let scan = driver.run(corpus, progress)?;

        if scan.entries_with_j > 0 {
            warn!(
                "{} protein(s) contain the ambiguous residue 'J'; enable il_equivalent or allow ambiguous residues (aaa_max > 0) to match them",
                scan.entries_with_j
            );
        }

        let mut stats = IndexStats::default();
        EvidenceAssembler::new(&self.evidence).apply(document, &needles, scan, &mut stats)?;

        let mut failures = Vec::new();
        if stats.entries_invalid_content > 0 {
            failures.push(FailureReason::InvalidProteinContent {
                entries: stats.entries_invalid_content,
            });
        }
        let status = if failures.is_empty() {
            ExitStatus::ExecutionOk
        } else {
            ExitStatus::UnexpectedResult
        };

        info!(
            "Indexed {} peptide hit(s) against {} protein(s) in {:.2?}: {} unique, {} non-unique, {} unmatched",
            needles.query_count(),
            stats.entries_scanned,
            started.elapsed(),
            stats.peptides_unique,
            stats.peptides_non_unique,
            stats.peptides_unmatched
        );

        Ok(IndexingReport {
            stats,
            status,
            failures,
        })
    }
}
