/// Terminal output for the indexing summary
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};
use pepindex_core::IndexStats;
use pepindex_engine::IndexingReport;

pub fn section_header(title: &str) {
    println!("\n{}", title.bold().cyan());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn create_standard_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .fg(TableColor::Cyan)
}

/// Format a number with thousands separator
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    }
}

fn count_row(table: &mut Table, label: &str, count: usize, total: usize) {
    table.add_row(vec![
        Cell::new(label),
        Cell::new(format_number(count)).set_alignment(CellAlignment::Right),
        Cell::new(percent(count, total)).set_alignment(CellAlignment::Right),
    ]);
}

pub fn peptide_table(stats: &IndexStats) -> Table {
    let total = stats.matched() + stats.peptides_unmatched;
    let mut table = create_standard_table();
    table.set_header(vec![header_cell("Peptide hits"), header_cell("Count"), header_cell("Share")]);
    count_row(&mut table, "target only", stats.peptides_target_only, total);
    count_row(&mut table, "decoy only", stats.peptides_decoy_only, total);
    count_row(&mut table, "target + decoy", stats.peptides_target_decoy, total);
    count_row(&mut table, "unique", stats.peptides_unique, total);
    count_row(&mut table, "non-unique", stats.peptides_non_unique, total);
    count_row(&mut table, "unmatched", stats.peptides_unmatched, total);
    if stats.peptides_removed > 0 {
        count_row(&mut table, "removed", stats.peptides_removed, total);
    }
    table
}

pub fn protein_table(stats: &IndexStats) -> Table {
    let referenced = stats.referenced_proteins();
    let mut table = create_standard_table();
    table.set_header(vec![header_cell("Proteins"), header_cell("Count"), header_cell("Share")]);
    count_row(&mut table, "scanned", stats.entries_scanned, stats.entries_scanned);
    count_row(&mut table, "referenced", referenced, stats.entries_scanned);
    count_row(&mut table, "  target", stats.proteins_referenced_target, referenced);
    count_row(&mut table, "  decoy", stats.proteins_referenced_decoy, referenced);
    count_row(&mut table, "new in output", stats.proteins_new, referenced);
    count_row(&mut table, "orphaned", stats.proteins_orphaned, referenced);
    table
}

pub fn print_report(report: &IndexingReport) {
    let stats = &report.stats;

    section_header("Peptides");
    println!("{}", peptide_table(stats));
    section_header("Proteins");
    println!("{}", protein_table(stats));

    println!(
        "\n{} {} accepted, {} rejected by the cleavage rule",
        "Hits:".bold(),
        format_number(stats.filter_passed),
        format_number(stats.filter_rejected)
    );

    if stats.entries_with_j > 0 {
        warning(&format!(
            "{} protein(s) contain 'J'; consider --il-equivalent",
            format_number(stats.entries_with_j)
        ));
    }
    if stats.duplicate_accessions > 0 {
        warning(&format!(
            "{} duplicate protein entr(ies) merged",
            format_number(stats.duplicate_accessions)
        ));
    }
    for failure in &report.failures {
        error(&failure.to_string());
    }
    if report.is_ok() {
        success("Indexing finished");
    } else {
        error(&format!("Indexing finished with status: {}", report.status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), "25.0%");
        assert_eq!(percent(3, 0), "-");
    }

    #[test]
    fn test_peptide_table_lists_removed_only_when_present() {
        let stats = IndexStats {
            peptides_unique: 3,
            peptides_unmatched: 1,
            ..Default::default()
        };
        let rendered = peptide_table(&stats).to_string();
        assert!(rendered.contains("unmatched"));
        assert!(rendered.contains("75.0%"));
        assert!(!rendered.contains("removed"));
    }
}
