//! crm-audit - Human-readable audit trails for CRM entities
//!
//! This library turns the audit log of a CRM entity (organization, contact,
//! service, user, opportunity) into readable change descriptions. Every
//! update in the log carries the entity's state before and after the change;
//! the diff engine reports only the edits that matter.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `audit`: Snapshot normalization, the diff engine, and the audit log model
//! - `config`: Configuration and path management
//! - `display`: Terminal formatting of audit histories
//! - `export`: CSV export of histories, JSON/YAML output of change sets
//! - `cli`: Command handlers for the `crm-audit` binary
//! - `error`: Custom error types
//! - `logging`: Diagnostic logging setup
//!
//! # Example
//!
//! ```rust
//! use crm_audit::audit::audit_details;
//! use serde_json::json;
//!
//! let before = json!({"details": [{"quantity": 2, "rate": 10}]});
//! let after = json!({"details": [{"quantity": 3, "rate": 10}]});
//!
//! assert_eq!(
//!     audit_details(Some(&before), Some(&after)),
//!     "Details Changed:\n  quantity: 2 → 3"
//! );
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;

pub use audit::{audit_details, ChangeSet};
pub use error::{AuditError, AuditResult};
