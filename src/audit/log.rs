//! Audit log documents
//!
//! Loads the audit history of an entity as saved from the audit log API.
//! Three layouts are accepted:
//!
//! - the API response envelope `{"data": [...]}`
//! - a bare JSON array of entries
//! - line-delimited JSON (JSONL), one entry per line

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AuditError, AuditResult};

use super::entry::AuditLogEntry;

/// API response wrapper around the entries
#[derive(Deserialize)]
struct Envelope {
    data: Vec<AuditLogEntry>,
}

/// Keys that mark a top-level object as a single audit row
const ROW_FIELDS: [&str; 7] = [
    "action_type",
    "username",
    "created_at",
    "entity_type",
    "entity_id",
    "old_data",
    "new_data",
];

/// Filter applied to loaded entries
///
/// Entries that do not carry a field pass that part of the filter; only an
/// entry with a different value is dropped.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

impl EntityFilter {
    /// Check if an entry passes the filter
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        let type_ok = match (&self.entity_type, &entry.entity_type) {
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
            _ => true,
        };
        let id_ok = match (&self.entity_id, entry.entity_id_text()) {
            (Some(wanted), Some(actual)) => *wanted == actual,
            _ => true,
        };
        type_ok && id_ok
    }
}

/// An audit history loaded from a document, oldest entry first
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditLogEntry>,
}

impl AuditLog {
    /// Build a log from entries already in memory
    pub fn new(entries: Vec<AuditLogEntry>) -> Self {
        Self { entries }
    }

    /// Load an audit log file
    pub fn load(path: &Path) -> AuditResult<Self> {
        let file = File::open(path).map_err(|e| {
            AuditError::Io(format!("Failed to open audit log {}: {}", path.display(), e))
        })?;
        let log = Self::from_reader(file)?;
        tracing::debug!(path = %path.display(), entries = log.len(), "loaded audit log");
        Ok(log)
    }

    /// Read an audit log document from any reader
    pub fn from_reader<R: Read>(reader: R) -> AuditResult<Self> {
        let mut contents = String::new();
        BufReader::new(reader)
            .read_to_string(&mut contents)
            .map_err(|e| AuditError::Io(format!("Failed to read audit log: {}", e)))?;
        Self::parse(&contents)
    }

    /// Parse an audit log document
    ///
    /// A document holding a single JSON value is read as an envelope, an
    /// array, or one row; a document with more than one value is read line
    /// by line as JSONL.
    pub fn parse(contents: &str) -> AuditResult<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut values = serde_json::Deserializer::from_str(contents).into_iter::<Value>();
        let first = match values.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => return Err(AuditError::parse(e.line(), e.to_string())),
            None => return Ok(Self::default()),
        };

        if values.next().is_some() {
            return Self::parse_lines(contents.as_bytes());
        }

        Self::from_document(first)
    }

    fn from_document(document: Value) -> AuditResult<Self> {
        let entries = if document.is_array() {
            serde_json::from_value(document)?
        } else if document.get("data").is_some() {
            serde_json::from_value::<Envelope>(document)?.data
        } else if is_row(&document) {
            vec![serde_json::from_value(document)?]
        } else {
            return Err(AuditError::Validation(
                "not an audit log: expected {\"data\": [...]}, an array of entries, or JSON lines"
                    .into(),
            ));
        };
        Ok(Self { entries })
    }

    fn parse_lines<R: BufRead>(reader: R) -> AuditResult<Self> {
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AuditError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditLogEntry = serde_json::from_str(&line)
                .map_err(|e| AuditError::parse(line_num + 1, e.to_string()))?;

            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Keep only the entries that pass the filter
    pub fn filter(self, filter: &EntityFilter) -> Self {
        let entries = self
            .entries
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();
        Self { entries }
    }

    /// Keep only the most recent `count` entries
    pub fn recent(mut self, count: usize) -> Self {
        let start = self.entries.len().saturating_sub(count);
        self.entries = self.entries.split_off(start);
        self
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_row(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| ROW_FIELDS.iter().any(|key| map.contains_key(*key)))
}

/// Resolve an input argument, where `-` means standard input
pub fn open_input(path: &str) -> AuditResult<Box<dyn Read>> {
    if path == "-" {
        return Ok(Box::new(std::io::stdin()));
    }
    let path = PathBuf::from(path);
    let file = File::open(&path)
        .map_err(|e| AuditError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    Ok(Box::new(file))
}
