//! Diff CLI command
//!
//! Compares two snapshot files and prints the meaningful changes.

use std::io::Read;

use clap::Args;
use serde_json::Value;

use crate::audit::{open_input, ChangeSet};
use crate::config::{DiffFormat, Settings};
use crate::error::{AuditError, AuditResult};
use crate::export::write_change_set;

/// Arguments of `diff`
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Snapshot before the change (JSON file, or "-" for stdin)
    pub old: String,

    /// Snapshot after the change (JSON file, or "-" for stdin)
    pub new: String,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<DiffFormat>,
}

/// Handle the diff command
pub fn handle_diff_command(settings: &Settings, args: DiffArgs) -> AuditResult<()> {
    if args.old == "-" && args.new == "-" {
        return Err(AuditError::Validation(
            "Only one snapshot can be read from stdin".into(),
        ));
    }

    let old = read_snapshot(&args.old)?;
    let new = read_snapshot(&args.new)?;

    let changes = ChangeSet::between(old.as_ref(), new.as_ref());
    tracing::debug!(changed = changes.len(), "compared snapshots");

    let format = args.format.unwrap_or(settings.diff_format);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_change_set(&changes, format, &mut handle)
}

/// Read a snapshot document; blank input counts as no snapshot
pub fn read_snapshot(path: &str) -> AuditResult<Option<Value>> {
    let mut contents = String::new();
    open_input(path)?
        .read_to_string(&mut contents)
        .map_err(|e| AuditError::Io(format!("Failed to read {}: {}", path, e)))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| AuditError::Json(format!("Invalid snapshot {}: {}", path, e)))
}
