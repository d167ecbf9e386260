//! Export module for crm-audit
//!
//! - CSV: audit history, one row per entry (spreadsheet-compatible)
//! - Text/JSON/YAML: the changes between two snapshots

pub mod changes;
pub mod csv;

pub use self::changes::write_change_set;
pub use self::csv::{export_history_csv, HISTORY_HEADERS};
