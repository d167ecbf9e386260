//! Custom error types for crm-audit
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. The diff engine itself never fails; these
//! errors cover loading snapshots, audit logs, settings, and writing exports.

use thiserror::Error;

/// The main error type for crm-audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid user input (arguments, filters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A line of a JSON Lines audit log could not be parsed
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl AuditError {
    /// Create a parse error for a specific audit log line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Check if this is a parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for crm-audit operations
pub type AuditResult<T> = Result<T, AuditError>;
