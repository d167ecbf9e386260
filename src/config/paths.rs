//! Path management for crm-audit
//!
//! ## Path Resolution Order
//!
//! 1. `CRM_AUDIT_HOME` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/crm-audit` or `~/.config/crm-audit`
//! 3. Windows: `%APPDATA%\crm-audit`

use std::path::PathBuf;

use crate::error::AuditError;

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "CRM_AUDIT_HOME";

/// Manages all paths used by crm-audit
#[derive(Debug, Clone)]
pub struct AuditPaths {
    /// Base directory for all crm-audit files
    base_dir: PathBuf,
}

impl AuditPaths {
    /// Create a new AuditPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home or config directory can be determined.
    pub fn new() -> Result<Self, AuditError> {
        let base_dir = match std::env::var(HOME_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create AuditPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/crm-audit/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), AuditError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| AuditError::Io(format!("Failed to create base directory: {}", e)))
    }

    /// Check if settings have been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default base directory based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, AuditError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                AuditError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("crm-audit"))
}

/// Resolve the default base directory based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, AuditError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| AuditError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("crm-audit"))
}
