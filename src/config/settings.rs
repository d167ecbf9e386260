//! User settings for crm-audit
//!
//! Controls how timestamps are shown in the history timeline and which
//! format `diff` prints by default.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::error::AuditError;

/// Time zone used when displaying audit timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTimeZone {
    /// The machine's local time zone (default)
    #[default]
    Local,
    Utc,
}

/// Output format for `diff`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiffFormat {
    /// The rendered change lines (default)
    #[default]
    Text,
    Json,
    Yaml,
}

impl fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffFormat::Text => write!(f, "text"),
            DiffFormat::Json => write!(f, "json"),
            DiffFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// User settings for crm-audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Timestamp format for the history timeline (strftime format)
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Time zone timestamps are shown in
    #[serde(default)]
    pub time_zone: DisplayTimeZone,

    /// Default output format for `diff`
    #[serde(default)]
    pub diff_format: DiffFormat,
}

fn default_schema_version() -> u32 {
    1
}

fn default_timestamp_format() -> String {
    // 05/Mar/2025 @ 14:07
    "%d/%b/%Y @ %H:%M".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            timestamp_format: default_timestamp_format(),
            time_zone: DisplayTimeZone::default(),
            diff_format: DiffFormat::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &AuditPaths) -> Result<Self, AuditError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| AuditError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                AuditError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AuditError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| AuditError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
