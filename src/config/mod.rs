//! Configuration module for crm-audit
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::AuditPaths;
pub use settings::{DiffFormat, DisplayTimeZone, Settings};
