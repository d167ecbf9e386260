//! Audit trail for CRM entities
//!
//! Turns the raw audit log of an entity (organizations, contacts,
//! opportunities, ...) into something a person can read.
//!
//! # Architecture
//!
//! - `FieldValue`: a snapshot field after normalization, so that `"5"` and
//!   `5`, or `""` and `null`, compare equal.
//! - `ChangeSet` / `audit_details`: the meaningful changes between two
//!   snapshots and their line-per-field rendering.
//! - `AuditLogEntry`: one row of the audit log API, with snapshots that may
//!   be JSON objects or serialized JSON strings.
//! - `AuditLog`: loads a saved audit log document and filters it.
//!
//! # Example
//!
//! ```rust
//! use crm_audit::audit::audit_details;
//! use serde_json::json;
//!
//! let before = json!({"description": "Call back", "updated_at": "2025-03-01"});
//! let after = json!({"description": "Follow up", "updated_at": "2025-03-05"});
//!
//! assert_eq!(
//!     audit_details(Some(&before), Some(&after)),
//!     "description: Call back → Follow up"
//! );
//! ```

mod diff;
mod entry;
mod log;
mod value;

pub use diff::{audit_details, is_excluded, ChangeSet, FieldChange, DETAILS_FIELD, EXCLUDED_FIELDS};
pub use entry::{parse_timestamp, ActionType, AuditLogEntry};
pub use log::{open_input, AuditLog, EntityFilter};
pub use value::{parse_number, FieldValue, Record};
