//! # World Configuration
//!
//! Tuning knobs for a [`World`](crate::World), loaded once at startup from a
//! TOML file or built in code. Every field has a default, so a config file
//! only needs to name the fields it changes:
//!
//! ```toml
//! entity_capacity = 65536
//! slow_system_warn_ms = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Default pre-reserved entity slots.
pub const DEFAULT_ENTITY_CAPACITY: usize = 1024;

/// Default pre-reserved group slots.
pub const DEFAULT_GROUP_CAPACITY: usize = 16;

/// Largest accepted `entity_capacity`.
pub const MAX_ENTITY_CAPACITY: usize = 1 << 24;

/// Largest accepted `group_capacity`.
pub const MAX_GROUP_CAPACITY: usize = 1 << 16;

/// Configuration for a world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Entity table capacity reserved at construction.
    pub entity_capacity: usize,
    /// Group table capacity reserved at construction.
    pub group_capacity: usize,
    /// Log a warning when one system's update takes longer than this.
    /// `None` disables timing.
    pub slow_system_warn_ms: Option<u64>,
    /// Emit a trace event summarizing each completed tick.
    pub log_ticks: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
            group_capacity: DEFAULT_GROUP_CAPACITY,
            slow_system_warn_ms: None,
            log_ticks: false,
        }
    }
}

impl WorldConfig {
    /// Sets the entity capacity hint.
    #[must_use]
    pub const fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Sets the group capacity hint.
    #[must_use]
    pub const fn with_group_capacity(mut self, capacity: usize) -> Self {
        self.group_capacity = capacity;
        self
    }

    /// Enables the slow-system warning.
    #[must_use]
    pub const fn with_slow_system_warning(mut self, budget_ms: u64) -> Self {
        self.slow_system_warn_ms = Some(budget_ms);
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] on malformed TOML, unknown keys or
    /// values rejected by [`WorldConfig::validate`].
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| EcsError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ConfigIo`] if the file cannot be read, otherwise
    /// the errors of [`WorldConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| EcsError::ConfigIo {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), ?config, "world configuration loaded");
        Ok(config)
    }

    /// Checks field values.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] when `slow_system_warn_ms` is zero
    /// or a capacity exceeds [`MAX_ENTITY_CAPACITY`] / [`MAX_GROUP_CAPACITY`].
    pub fn validate(&self) -> EcsResult<()> {
        if self.entity_capacity > MAX_ENTITY_CAPACITY {
            return Err(EcsError::InvalidConfig(format!(
                "entity_capacity {} exceeds the maximum of {MAX_ENTITY_CAPACITY}",
                self.entity_capacity
            )));
        }
        if self.group_capacity > MAX_GROUP_CAPACITY {
            return Err(EcsError::InvalidConfig(format!(
                "group_capacity {} exceeds the maximum of {MAX_GROUP_CAPACITY}",
                self.group_capacity
            )));
        }
        if self.slow_system_warn_ms == Some(0) {
            return Err(EcsError::InvalidConfig(
                "slow_system_warn_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> EcsResult<String> {
        toml::to_string(self).map_err(|err| EcsError::InvalidConfig(err.to_string()))
    }
}
