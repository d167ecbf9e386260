//! Audit log entry data structures
//!
//! One entry per row of the audit log API: what happened to an entity, who
//! did it, when, and the entity's snapshots before and after the action.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::diff::{audit_details, ChangeSet};

/// Types of actions recorded in the audit log
///
/// Parsed case-insensitively; unknown actions are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// Entity was created
    Create,
    /// Entity was updated; the only action with a change description
    Update,
    /// Entity was closed
    Closed,
    /// Entity was viewed
    View,
    Other(String),
}

impl Default for ActionType {
    fn default() -> Self {
        ActionType::Other(String::new())
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "CREATE" => ActionType::Create,
            "UPDATE" => ActionType::Update,
            "CLOSED" => ActionType::Closed,
            "VIEW" => ActionType::View,
            _ => ActionType::Other(value),
        }
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        action.to_string()
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "CREATE"),
            ActionType::Update => write!(f, "UPDATE"),
            ActionType::Closed => write!(f, "CLOSED"),
            ActionType::View => write!(f, "VIEW"),
            ActionType::Other(action) => write!(f, "{}", action),
        }
    }
}

/// A single audit log entry
///
/// Snapshots may arrive either as JSON objects or as strings holding
/// serialized JSON; both forms are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// What was done to the entity
    #[serde(default)]
    pub action_type: ActionType,

    /// Who did it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// When it happened, as sent by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Kind of entity affected (e.g. "opportunities")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    /// ID of the affected entity; the API sends numbers or strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Value>,

    /// Snapshot before the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_data: Option<Value>,

    /// Snapshot after the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_data: Option<Value>,
}

impl AuditLogEntry {
    /// Decoded snapshot before the action
    pub fn old_snapshot(&self) -> Option<Cow<'_, Value>> {
        decode_snapshot(self.old_data.as_ref())
    }

    /// Decoded snapshot after the action
    pub fn new_snapshot(&self) -> Option<Cow<'_, Value>> {
        decode_snapshot(self.new_data.as_ref())
    }

    /// Structured changes between the two snapshots
    pub fn changes(&self) -> ChangeSet {
        let old = self.old_snapshot();
        let new = self.new_snapshot();
        ChangeSet::between(old.as_deref(), new.as_deref())
    }

    /// Change description shown for this entry
    ///
    /// Only updates carry one; every other action yields an empty string.
    pub fn description(&self) -> String {
        if self.action_type != ActionType::Update {
            return String::new();
        }
        let old = self.old_snapshot();
        let new = self.new_snapshot();
        audit_details(old.as_deref(), new.as_deref())
    }

    /// Entity ID as text, whether the API sent a number or a string
    pub fn entity_id_text(&self) -> Option<String> {
        match self.entity_id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Parse `created_at`
    ///
    /// Accepts RFC 3339, or `YYYY-MM-DD HH:MM:SS` (with optional `T` and
    /// fractional seconds) taken as local time.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.created_at.as_deref()?)
    }
}

/// Parse an audit timestamp as sent by the API
///
/// Timestamps without an offset are wall-clock times in the local zone.
/// One that falls in a daylight-saving gap does not parse.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.fixed_offset())
}

fn decode_snapshot(raw: Option<&Value>) -> Option<Cow<'_, Value>> {
    match raw? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(decoded) => Some(Cow::Owned(decoded)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring undecodable audit snapshot");
                None
            }
        },
        value => Some(Cow::Borrowed(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn update_entry(old: Value, new: Value) -> AuditLogEntry {
        AuditLogEntry {
            action_type: ActionType::Update,
            username: Some("bob".into()),
            created_at: Some("2025-03-05T14:07:00Z".into()),
            old_data: Some(old),
            new_data: Some(new),
            ..Default::default()
        }
    }

    #[test]
    fn test_action_type_parse() {
        assert_eq!(ActionType::from("CREATE".to_string()), ActionType::Create);
        assert_eq!(ActionType::from("update".to_string()), ActionType::Update);
        assert_eq!(ActionType::from("Closed".to_string()), ActionType::Closed);
        assert_eq!(ActionType::from("VIEW".to_string()), ActionType::View);
        assert_eq!(
            ActionType::from("REOPEN".to_string()),
            ActionType::Other("REOPEN".into())
        );
    }

    #[test]
    fn test_action_type_display() {
        assert_eq!(ActionType::Create.to_string(), "CREATE");
        assert_eq!(ActionType::Closed.to_string(), "CLOSED");
        assert_eq!(ActionType::Other("REOPEN".into()).to_string(), "REOPEN");
    }

    #[test]
    fn test_deserialize_api_row() {
        let row = json!({
            "action_type": "UPDATE",
            "username": "bob",
            "created_at": "2025-03-05 14:07:00",
            "entity_type": "opportunities",
            "entity_id": 42,
            "old_data": {"stage": "Lead"},
            "new_data": {"stage": "Won"}
        });

        let entry: AuditLogEntry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.action_type, ActionType::Update);
        assert_eq!(entry.username.as_deref(), Some("bob"));
        assert_eq!(entry.entity_id_text().as_deref(), Some("42"));
        assert_eq!(entry.description(), "stage: Lead → Won");
    }

    #[test]
    fn test_string_encoded_snapshots() {
        let entry = update_entry(
            json!("{\"description\": \"Call back\"}"),
            json!("{\"description\": \"Follow up\"}"),
        );
        assert_eq!(entry.description(), "description: Call back → Follow up");
    }

    #[test]
    fn test_undecodable_snapshot_is_absent() {
        let entry = update_entry(json!("{not json"), json!({"stage": "Won"}));
        assert!(entry.old_snapshot().is_none());
        assert_eq!(entry.description(), "");
    }

    #[test]
    fn test_description_only_for_updates() {
        let mut entry = update_entry(json!({"stage": "Lead"}), json!({"stage": "Won"}));
        entry.action_type = ActionType::Create;
        assert_eq!(entry.description(), "");
        assert!(!entry.changes().is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let entry: AuditLogEntry = serde_json::from_value(json!({})).unwrap();
        assert_eq!(entry.action_type, ActionType::Other(String::new()));
        assert!(entry.username.is_none());
        assert!(entry.timestamp().is_none());
        assert_eq!(entry.description(), "");
    }

    #[test]
    fn test_parse_timestamps() {
        let rfc = parse_timestamp("2025-03-05T14:07:00+04:00").unwrap();
        assert_eq!(rfc.hour(), 14);

        let naive = parse_timestamp("2025-03-05 14:07:09.123").unwrap();
        assert_eq!(naive.day(), 5);
        assert_eq!(naive.minute(), 7);

        let t_naive = parse_timestamp("2025-03-05T14:07:09").unwrap();
        assert_eq!(t_naive.second(), 9);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_naive_timestamp_keeps_wall_clock() {
        let parsed = parse_timestamp("2025-03-05 14:07:00").unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!((local.hour(), local.minute()), (14, 7));
        assert_eq!(
            parsed.naive_local(),
            NaiveDateTime::parse_from_str("2025-03-05 14:07:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let entry = update_entry(json!({"a": 1}), json!({"a": 2}));
        let text = serde_json::to_string(&entry).unwrap();
        let back: AuditLogEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back.action_type, ActionType::Update);
        assert_eq!(back.description(), "a: 1 → 2");
    }
}
