//! History timeline formatting
//!
//! Renders an entity's audit log as a vertical timeline: one step per entry
//! with the action, who performed it and when, and the change description
//! for updates.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::audit::AuditLogEntry;
use crate::config::{DisplayTimeZone, Settings};

const CONNECTOR: &str = "    |\n    v\n";

/// Format a timestamp for display using the configured format and zone
///
/// Falls back to RFC 3339 when the configured format is invalid.
pub fn format_timestamp(timestamp: &DateTime<FixedOffset>, settings: &Settings) -> String {
    let mut output = String::new();
    let written = match settings.time_zone {
        DisplayTimeZone::Local => write!(
            output,
            "{}",
            timestamp.with_timezone(&Local).format(&settings.timestamp_format)
        ),
        DisplayTimeZone::Utc => write!(
            output,
            "{}",
            timestamp.with_timezone(&Utc).format(&settings.timestamp_format)
        ),
    };

    match written {
        Ok(()) => output,
        Err(_) => {
            tracing::warn!(
                format = %settings.timestamp_format,
                "invalid timestamp format in settings"
            );
            timestamp.to_rfc3339()
        }
    }
}

/// The "when" text of an entry, or `None` if the entry has no timestamp
///
/// Timestamps that cannot be parsed are shown as sent.
pub fn entry_time(entry: &AuditLogEntry, settings: &Settings) -> Option<String> {
    let raw = entry.created_at.as_deref()?;
    Some(match entry.timestamp() {
        Some(timestamp) => format_timestamp(&timestamp, settings),
        None => raw.to_string(),
    })
}

/// Format a single timeline step
pub fn format_step(entry: &AuditLogEntry, settings: &Settings) -> String {
    let mut output = format!("{}\n", entry.action_type);

    if let Some(when) = entry_time(entry, settings) {
        output.push_str(&format!(
            "  By: {} {}\n",
            entry.username.as_deref().unwrap_or_default(),
            when
        ));
    }

    let description = entry.description();
    for line in description.lines() {
        output.push_str(&format!("  {}\n", line));
    }

    output
}

/// Format a full audit history as a timeline
pub fn format_history(entries: &[AuditLogEntry], settings: &Settings) -> String {
    if entries.is_empty() {
        return "No audit history found.".to_string();
    }

    let steps: Vec<String> = entries
        .iter()
        .map(|entry| format_step(entry, settings))
        .collect();

    steps.join(CONNECTOR).trim_end().to_string()
}
