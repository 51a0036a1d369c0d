//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use fmdb_core::{CascadeReport, QueryResult};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Tell the user when a listing hit its page limit.
pub fn warn_if_truncated<T>(result: &QueryResult<T>, quiet: bool) {
    if result.possibly_truncated && !quiet {
        eprintln!(
            "warning: listing stopped at {} entries; there may be more",
            result.docs.len()
        );
    }
}

/// Print what a rename moved, one `old -> new` per line, to stderr.
pub fn print_cascade(report: &CascadeReport, quiet: bool) {
    if quiet {
        return;
    }
    for (old, new) in &report.moved {
        eprintln!("  moved {old} -> {new}");
    }
    for failure in &report.failed {
        eprintln!("  FAILED {}: {}", failure.id, failure.error);
    }
    for (device, target) in &report.dangling {
        eprintln!("  warning: {device} still links to {target}");
    }
}
