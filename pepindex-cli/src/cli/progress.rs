use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner counting scanned proteins, hidden when PEPINDEX_SILENT is set
pub fn scan_progress() -> ProgressBar {
    if std::env::var_os("PEPINDEX_SILENT").is_some() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {pos} proteins scanned ({per_sec})")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
