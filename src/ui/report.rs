//! Status report and copied notices
//!
//! Everything here returns `String`; the caller decides where it goes.
//! Styling is dropped automatically when stdout is not a terminal.

use crate::pending::PendingSet;
use crate::types::PathPair;
use chrono::{DateTime, Local};
use console::style;
use indicatif::HumanBytes;
use std::path::Path;

/// Shown in every report as a reminder of the pair list syntax
pub const EXAMPLE_LINE: &str = r"C:\dir\name.dll > C:\other\name.dll";

const RULE: &str = "=========================";

/// Render the per-cycle status report.
///
/// Lists every pending pair with its last error, or a single
/// "Done for N files" line when nothing is pending.
pub fn format_status(
    pairs_file: &Path,
    pairs: &[PathPair],
    pending: &PendingSet,
    at: DateTime<Local>,
) -> String {
    let mut lines = Vec::with_capacity(8 + pending.len() * 5);
    lines.push(RULE.to_string());
    lines.push(format!(
        "{} watching files listed in {}",
        style("dllwatch").bold(),
        pairs_file.display()
    ));
    lines.push(format!("{} example line:", pairs_file.display()));
    lines.push(format!("  {}", EXAMPLE_LINE));
    lines.push(format!("Cycle at {}", at.format("%Y-%m-%d %H:%M:%S")));

    if pending.is_empty() {
        lines.push(
            style(format!("Done for {} files", pairs.len()))
                .green()
                .to_string(),
        );
    } else {
        lines.push(String::new());
        lines.push(
            style(format!("ERROR: {} pending move(s):", pending.len()))
                .red()
                .bold()
                .to_string(),
        );
        lines.push(String::new());

        for entry in pending.entries() {
            let Some(pair) = pairs.get(entry.pair_index) else {
                continue;
            };
            lines.push(pair.source.display().to_string());
            lines.push("to".to_string());
            lines.push(pair.destination.display().to_string());
            lines.push(format!("Error: {}", style(&entry.last_error).yellow()));
            lines.push(String::new());
        }
    }

    lines.push(RULE.to_string());
    lines.join("\n")
}

/// One line announcing a successful copy
pub fn format_copied_notice(file_name: &str, bytes: u64) -> String {
    format!(
        " ===> {} {} ({})",
        style("Copied").green(),
        file_name,
        HumanBytes(bytes)
    )
}
