//! CSV Export functionality
//!
//! Exports an audit history to CSV, one row per entry.

use std::io::Write;

use crate::audit::AuditLogEntry;
use crate::config::Settings;
use crate::display::entry_time;
use crate::error::{AuditError, AuditResult};

/// Column headers of the history export
pub const HISTORY_HEADERS: [&str; 4] = ["Action", "User", "Timestamp", "Changes"];

/// Export an audit history to CSV
///
/// The `Changes` column holds the multi-line change description of updates.
pub fn export_history_csv<W: Write>(
    entries: &[AuditLogEntry],
    settings: &Settings,
    writer: W,
) -> AuditResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(HISTORY_HEADERS)
        .map_err(|e| AuditError::Export(e.to_string()))?;

    for entry in entries {
        let action = entry.action_type.to_string();
        let user = entry.username.clone().unwrap_or_default();
        let when = entry_time(entry, settings).unwrap_or_default();
        let changes = entry.description();

        csv_writer
            .write_record([action.as_str(), user.as_str(), when.as_str(), changes.as_str()])
            .map_err(|e| AuditError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| AuditError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ActionType, AuditLog};
    use crate::config::DisplayTimeZone;

    fn utc_settings() -> Settings {
        Settings {
            time_zone: DisplayTimeZone::Utc,
            ..Settings::default()
        }
    }

    #[test]
    fn test_history_export() {
        let log = AuditLog::parse(
            r#"[
                {"action_type": "CREATE", "username": "alice", "created_at": "2025-03-01T09:00:00Z"},
                {"action_type": "UPDATE", "username": "bob, jr", "created_at": "2025-03-05T14:07:00Z",
                 "old_data": {"stage": "Lead", "amount": 100},
                 "new_data": {"stage": "Won", "amount": 120}}
            ]"#,
        )
        .unwrap();

        let mut output = Vec::new();
        export_history_csv(log.entries(), &utc_settings(), &mut output).unwrap();
        let csv = String::from_utf8(output).unwrap();

        assert_eq!(
            csv,
            "Action,User,Timestamp,Changes\n\
             CREATE,alice,01/Mar/2025 @ 09:00,\n\
             UPDATE,\"bob, jr\",05/Mar/2025 @ 14:07,\"stage: Lead → Won\namount: 100 → 120\"\n"
        );
    }

    #[test]
    fn test_export_reads_back() {
        let log = AuditLog::new(vec![AuditLogEntry {
            action_type: ActionType::View,
            ..Default::default()
        }]);

        let mut output = Vec::new();
        export_history_csv(log.entries(), &utc_settings(), &mut output).unwrap();

        let mut reader = csv::Reader::from_reader(output.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HISTORY_HEADERS.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "VIEW");
        assert_eq!(&rows[0][1], "");
    }
}
