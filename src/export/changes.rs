//! Change set output
//!
//! Writes the result of a snapshot comparison as text, JSON, or YAML.

use std::io::Write;

use crate::audit::ChangeSet;
use crate::config::DiffFormat;
use crate::error::{AuditError, AuditResult};

/// Write a change set in the requested format
///
/// Text output is the rendered change lines and nothing at all when no
/// meaningful change was found.
pub fn write_change_set<W: Write>(
    changes: &ChangeSet,
    format: DiffFormat,
    writer: &mut W,
) -> AuditResult<()> {
    match format {
        DiffFormat::Text => {
            let rendered = changes.render();
            if !rendered.is_empty() {
                writeln!(writer, "{}", rendered)
                    .map_err(|e| AuditError::Export(e.to_string()))?;
            }
        }
        DiffFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, changes)
                .map_err(|e| AuditError::Export(e.to_string()))?;
            writeln!(writer).map_err(|e| AuditError::Export(e.to_string()))?;
        }
        DiffFormat::Yaml => {
            serde_yaml::to_writer(&mut *writer, changes)
                .map_err(|e| AuditError::Export(e.to_string()))?;
        }
    }

    Ok(())
}
