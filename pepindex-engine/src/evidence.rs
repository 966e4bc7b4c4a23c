//! Turns validated match records into peptide evidences, protein hits and
//! run statistics
//!
//! Policy checks run before the document is touched: a run that fails on
//! unmatched peptides, missing decoys or conflicting accessions leaves the
//! identification records exactly as they were loaded.

use pepindex_bio::decoy::DecoyLabel;
use pepindex_bio::identification::{
    IdentificationDocument, PeptideEvidence, ProteinHit, ProteinReferences, TargetDecoy,
};
use pepindex_core::{
    IndexStats, IndexerConfig, MissingDecoyAction, PepIndexError, PepIndexResult, UnmatchedAction,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use tracing::{error, info, warn};

use crate::accumulator::MatchRecord;
use crate::driver::{AccessionTable, ReferencedEntry, ScanResult};
use crate::needles::NeedleSet;

/// Unmatched peptide sequences listed individually in the log
const UNMATCHED_LOG_LIMIT: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceOptions {
    pub unmatched_action: UnmatchedAction,
    pub missing_decoy_action: MissingDecoyAction,
    pub keep_unreferenced_proteins: bool,
    pub write_protein_sequence: bool,
    pub write_protein_description: bool,
    pub decoy: DecoyLabel,
}

impl EvidenceOptions {
    pub fn from_config(config: &IndexerConfig) -> Self {
        Self {
            unmatched_action: config.policy.unmatched_action,
            missing_decoy_action: config.policy.missing_decoy_action,
            keep_unreferenced_proteins: config.output.keep_unreferenced_proteins,
            write_protein_sequence: config.output.write_protein_sequence,
            write_protein_description: config.output.write_protein_description,
            decoy: DecoyLabel::new(config.decoy.string.clone(), config.decoy.position),
        }
    }
}

/// Everything known about one needle after the scan
#[derive(Debug, Clone, Default)]
struct NeedleSummary {
    evidences: Vec<PeptideEvidence>,
    /// Distinct entries, ascending
    entries: Vec<u32>,
    target: bool,
    decoy: bool,
}

impl NeedleSummary {
    fn target_decoy(&self) -> Option<TargetDecoy> {
        TargetDecoy::from_flags(self.target, self.decoy)
    }

    fn references(&self) -> ProteinReferences {
        ProteinReferences::from_count(self.entries.len())
    }
}

pub struct EvidenceAssembler<'a> {
    options: &'a EvidenceOptions,
}

impl<'a> EvidenceAssembler<'a> {
    pub fn new(options: &'a EvidenceOptions) -> Self {
        Self { options }
    }

    /// Annotate `document` with the matches of `scan` and fill `stats`.
    pub fn apply(
        &self,
        document: &mut IdentificationDocument,
        needles: &NeedleSet,
        scan: ScanResult,
        stats: &mut IndexStats,
    ) -> PepIndexResult<()> {
        let ScanResult {
            mut accumulator,
            mut referenced,
            accessions,
            entries_scanned,
            entries_invalid_content,
            entries_with_j,
        } = scan;

        stats.needles = needles.len();
        stats.entries_scanned = entries_scanned;
        stats.entries_invalid_content = entries_invalid_content;
        stats.entries_with_j = entries_with_j;
        stats.filter_passed = accumulator.accepted();
        stats.filter_rejected = accumulator.rejected();

        let remap = resolve_duplicate_accessions(&accessions)?;
        stats.duplicate_accessions = remap.len();
        if !remap.is_empty() {
            for record in accumulator.records_mut().iter_mut() {
                if let Some(&first) = remap.get(&record.entry) {
                    record.entry = first;
                }
            }
            // the first occurrence may not have matched anything itself
            for (other, first) in &remap {
                if let Some(entry) = referenced.remove(other) {
                    referenced.entry(*first).or_insert(entry);
                }
            }
        }
        accumulator.sort_dedup();

        let summaries = summarize(accumulator.records(), needles, &referenced)?;
        count_referenced_proteins(accumulator.records(), &referenced, stats);

        self.check_policies(document, needles, &summaries, stats)?;
        let run_references = self.annotate_peptides(document, needles, &summaries, stats);
        self.update_protein_runs(document, &run_references, &referenced, stats);

        Ok(())
    }

    /// Count peptide outcomes and enforce the unmatched / missing decoy
    /// policies without modifying the document.
    fn check_policies(
        &self,
        document: &IdentificationDocument,
        needles: &NeedleSet,
        summaries: &[NeedleSummary],
        stats: &mut IndexStats,
    ) -> PepIndexResult<()> {
        let mut unmatched: Vec<&str> = Vec::new();
        let mut query = 0;
        for identification in &document.peptides {
            for hit in &identification.hits {
                let summary = &summaries[needles.query_needle(query) as usize];
                query += 1;

                match summary.references() {
                    ProteinReferences::Unmatched => {
                        stats.peptides_unmatched += 1;
                        unmatched.push(&hit.sequence);
                    }
                    ProteinReferences::Unique => stats.peptides_unique += 1,
                    ProteinReferences::NonUnique => stats.peptides_non_unique += 1,
                }
                match summary.target_decoy() {
                    Some(TargetDecoy::Target) => stats.peptides_target_only += 1,
                    Some(TargetDecoy::Decoy) => stats.peptides_decoy_only += 1,
                    Some(TargetDecoy::TargetDecoy) => stats.peptides_target_decoy += 1,
                    None => {}
                }
            }
        }

        if !unmatched.is_empty() {
            let fatal = self.options.unmatched_action == UnmatchedAction::Error;
            log_unmatched(&unmatched, fatal);
            if fatal {
                return Err(PepIndexError::UnmatchedPeptides {
                    count: unmatched.len(),
                });
            }
        }

        if stats.decoy_matches() == 0 {
            let decoy = &self.options.decoy;
            match self.options.missing_decoy_action {
                MissingDecoyAction::Error => {
                    error!(
                        "No peptide hit matched a decoy protein (decoy label {}). Check the decoy settings or set the missing decoy action to 'warn'.",
                        decoy
                    );
                    return Err(PepIndexError::MissingDecoys {
                        label: decoy.label.clone(),
                        position: decoy.position.to_string(),
                    });
                }
                MissingDecoyAction::Warn => {
                    warn!("No peptide hit matched a decoy protein (decoy label {})", decoy)
                }
                MissingDecoyAction::Silent => {}
            }
        }

        Ok(())
    }

    /// Write evidences and annotations onto every peptide hit. Returns the
    /// entries referenced by each protein run.
    fn annotate_peptides(
        &self,
        document: &mut IdentificationDocument,
        needles: &NeedleSet,
        summaries: &[NeedleSummary],
        stats: &mut IndexStats,
    ) -> FxHashMap<String, BTreeSet<u32>> {
        let mut run_references: FxHashMap<String, BTreeSet<u32>> = FxHashMap::default();
        let mut query = 0;

        for identification in document.peptides.iter_mut() {
            let run = run_references
                .entry(identification.identifier.clone())
                .or_default();
            let hits = std::mem::take(&mut identification.hits);

            for mut hit in hits {
                let summary = &summaries[needles.query_needle(query) as usize];
                query += 1;

                if summary.entries.is_empty()
                    && self.options.unmatched_action == UnmatchedAction::Remove
                {
                    stats.peptides_removed += 1;
                    continue;
                }

                hit.evidences = summary.evidences.clone();
                hit.target_decoy = summary.target_decoy();
                hit.protein_references = Some(summary.references());
                run.extend(summary.entries.iter().copied());
                identification.hits.push(hit);
            }
        }

        run_references
    }

    /// Keep referenced protein hits, drop or keep orphans, append newly
    /// referenced proteins and label every hit target or decoy.
    fn update_protein_runs(
        &self,
        document: &mut IdentificationDocument,
        run_references: &FxHashMap<String, BTreeSet<u32>>,
        referenced: &FxHashMap<u32, ReferencedEntry>,
        stats: &mut IndexStats,
    ) {
        let empty = BTreeSet::new();
        let known_runs: FxHashSet<&str> = document
            .proteins
            .iter()
            .map(|run| run.identifier.as_str())
            .collect();

        let mut missing: Vec<&String> = run_references
            .iter()
            .filter(|(id, refs)| !refs.is_empty() && !known_runs.contains(id.as_str()))
            .map(|(id, _)| id)
            .collect();
        missing.sort();
        for id in missing {
            warn!(
                "Peptide identifications refer to protein run '{}', which is not in the input; its proteins are not recorded",
                id
            );
        }

        for run in document.proteins.iter_mut() {
            let refs = run_references.get(&run.identifier).unwrap_or(&empty);
            let mut by_accession: FxHashMap<&str, &ReferencedEntry> = FxHashMap::default();
            for entry in refs.iter().filter_map(|idx| referenced.get(idx)) {
                by_accession.insert(entry.accession.as_str(), entry);
            }

            let mut seen: FxHashSet<String> = FxHashSet::default();
            let hits = std::mem::take(&mut run.hits);
            for mut hit in hits {
                match by_accession.get(hit.accession.as_str()) {
                    Some(entry) => {
                        self.fill_protein_hit(&mut hit, entry);
                        seen.insert(hit.accession.clone());
                        run.hits.push(hit);
                    }
                    None => {
                        stats.proteins_orphaned += 1;
                        if self.options.keep_unreferenced_proteins {
                            hit.target_decoy = Some(if self.options.decoy.is_decoy(&hit.accession) {
                                TargetDecoy::Decoy
                            } else {
                                TargetDecoy::Target
                            });
                            run.hits.push(hit);
                        }
                    }
                }
            }

            for entry in refs.iter().filter_map(|idx| referenced.get(idx)) {
                if seen.contains(&entry.accession) {
                    continue;
                }
                let mut hit = ProteinHit::new(entry.accession.clone());
                self.fill_protein_hit(&mut hit, entry);
                seen.insert(entry.accession.clone());
                run.hits.push(hit);
                stats.proteins_new += 1;
            }
        }

        if stats.proteins_orphaned > 0 {
            let action = if self.options.keep_unreferenced_proteins {
                "kept"
            } else {
                "removed"
            };
            info!(
                "{} protein hit(s) no longer referenced by any peptide were {}",
                stats.proteins_orphaned, action
            );
        }
    }

    fn fill_protein_hit(&self, hit: &mut ProteinHit, entry: &ReferencedEntry) {
        if let (true, Some(sequence)) = (self.options.write_protein_sequence, &entry.sequence) {
            hit.sequence = Some(String::from_utf8_lossy(sequence).into_owned());
        }
        if self.options.write_protein_description {
            hit.description = entry.description.clone();
        }
        hit.target_decoy = Some(if entry.is_decoy {
            TargetDecoy::Decoy
        } else {
            TargetDecoy::Target
        });
    }
}

/// Map later entries of a repeated accession onto the first one.
///
/// Every scanned entry takes part, matched or not. Repeats with an identical
/// sequence are collapsed with a warning, repeats with a different sequence
/// are fatal.
fn resolve_duplicate_accessions(accessions: &AccessionTable) -> PepIndexResult<FxHashMap<u32, u32>> {
    let repeated = accessions.repeated();

    if let Some((accession, _)) = repeated.iter().find(|(_, occ)| occ.conflicting) {
        error!(
            "Protein identifier '{}' occurs more than once in the database with different sequences",
            accession
        );
        return Err(PepIndexError::DuplicateAccession {
            accession: accession.to_string(),
        });
    }

    let mut remap = FxHashMap::default();
    for (accession, occurrences) in repeated {
        let first = occurrences.first();
        for &other in occurrences.indices.iter().filter(|&&idx| idx != first) {
            remap.insert(other, first);
        }
        warn!(
            "Protein identifier '{}' occurs {} times in the database with identical sequences; using the first occurrence",
            accession,
            occurrences.indices.len()
        );
    }

    Ok(remap)
}

/// Group sorted records by needle.
fn summarize(
    records: &[MatchRecord],
    needles: &NeedleSet,
    referenced: &FxHashMap<u32, ReferencedEntry>,
) -> PepIndexResult<Vec<NeedleSummary>> {
    let mut summaries = vec![NeedleSummary::default(); needles.len()];

    for record in records {
        let entry = referenced.get(&record.entry).ok_or_else(|| {
            PepIndexError::Other(format!(
                "match refers to protein index {} that was never recorded",
                record.entry
            ))
        })?;
        let summary = &mut summaries[record.needle as usize];
        let len = needles.sequence(record.needle).len();

        if summary.entries.last() != Some(&record.entry) {
            summary.entries.push(record.entry);
        }
        if entry.is_decoy {
            summary.decoy = true;
        } else {
            summary.target = true;
        }
        summary.evidences.push(PeptideEvidence {
            accession: entry.accession.clone(),
            start: record.position as usize,
            end: record.position as usize + len - 1,
            aa_before: record.aa_before as char,
            aa_after: record.aa_after as char,
        });
    }

    Ok(summaries)
}

fn count_referenced_proteins(
    records: &[MatchRecord],
    referenced: &FxHashMap<u32, ReferencedEntry>,
    stats: &mut IndexStats,
) {
    let entries: FxHashSet<u32> = records.iter().map(|r| r.entry).collect();
    for idx in entries {
        match referenced.get(&idx) {
            Some(entry) if entry.is_decoy => stats.proteins_referenced_decoy += 1,
            Some(_) => stats.proteins_referenced_target += 1,
            None => {}
        }
    }
}

fn log_unmatched(sequences: &[&str], fatal: bool) {
    let shown = sequences.len().min(UNMATCHED_LOG_LIMIT);
    let listing = sequences[..shown].join("\n  ");
    let more = if sequences.len() > shown { "\n  ..." } else { "" };

    if fatal {
        error!(
            "{} peptide hit(s) could not be matched to any protein:\n  {}{}",
            sequences.len(),
            listing,
            more
        );
    } else {
        warn!(
            "{} peptide hit(s) could not be matched to any protein:\n  {}{}",
            sequences.len(),
            listing,
            more
        );
    }
}
