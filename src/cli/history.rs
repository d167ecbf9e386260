//! History CLI command
//!
//! Shows the audit timeline of an entity from a saved audit log, or exports
//! it to CSV.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;

use crate::audit::{open_input, AuditLog, EntityFilter};
use crate::config::Settings;
use crate::display::format_history;
use crate::error::{AuditError, AuditResult};
use crate::export::export_history_csv;

/// Arguments of `history`
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Audit log document: API response, JSON array, or JSONL ("-" for stdin)
    pub file: String,

    /// Only entries for this entity type (e.g. "opportunities")
    #[arg(short = 't', long)]
    pub entity_type: Option<String>,

    /// Only entries for this entity ID
    #[arg(short = 'i', long)]
    pub entity_id: Option<String>,

    /// Show only the most recent N entries
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Export to CSV file instead of printing the timeline
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the history command
pub fn handle_history_command(settings: &Settings, args: HistoryArgs) -> AuditResult<()> {
    let filter = EntityFilter {
        entity_type: args.entity_type,
        entity_id: args.entity_id,
    };

    let mut log = AuditLog::from_reader(open_input(&args.file)?)?.filter(&filter);
    if let Some(limit) = args.limit {
        log = log.recent(limit);
    }
    tracing::debug!(entries = log.len(), "audit history selected");

    if let Some(path) = args.output {
        let file = File::create(&path).map_err(|e| {
            AuditError::Export(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        export_history_csv(log.entries(), settings, BufWriter::new(file))?;
        println!("Audit history exported to: {}", path.display());
    } else {
        println!("{}", format_history(log.entries(), settings));
    }

    Ok(())
}
