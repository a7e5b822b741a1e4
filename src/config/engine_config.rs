//! EngineConfig: database location, pool sizing, lock timeout, audit toggle.

use serde::{Deserialize, Serialize};

use crate::errors::{PermissionError, PermissionResult};

/// Configuration for the permission engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the permissions database. `None` opens an in-memory database.
    pub db_path: Option<String>,
    /// Number of read-only connections next to the single writer.
    pub read_pool_size: usize,
    /// SQLite busy_timeout applied to every connection.
    pub busy_timeout_ms: u32,
    /// Append structural operations to `permission_events`.
    pub record_events: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: 2,
            busy_timeout_ms: 5000,
            record_events: true,
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> PermissionResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| PermissionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would leave writers without lock contention handling.
    pub fn validate(&self) -> PermissionResult<()> {
        if self.busy_timeout_ms == 0 {
            return Err(PermissionError::Config(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert!(config.db_path.is_none());
        assert_eq!(config.read_pool_size, 2);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.record_events);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EngineConfig::from_toml(
            r#"
            db_path = "/var/lib/pages/permissions.db"
            record_events = false
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path.as_deref(), Some("/var/lib/pages/permissions.db"));
        assert!(!config.record_events);
        assert_eq!(config.read_pool_size, 2);
    }

    #[test]
    fn test_zero_busy_timeout_rejected() {
        let err = EngineConfig::from_toml("busy_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, PermissionError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = EngineConfig::from_toml("read_pool_size = \"many\"").unwrap_err();
        assert!(matches!(err, PermissionError::Config(_)));
    }
}
