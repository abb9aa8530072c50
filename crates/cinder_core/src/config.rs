//! # World Configuration
//!
//! Capacities a [`World`](crate::World) is created with, loadable from TOML.
//!
//! ```toml
//! max_entities = 4096
//! component_types = 16
//! max_systems = 32
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacities of a world. Missing TOML keys fall back to [`Default`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Maximum number of live entities. Must be non-zero.
    pub max_entities: u32,
    /// Number of component type ids (`0..component_types`).
    pub component_types: u32,
    /// Maximum number of registered systems.
    pub max_systems: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: 1024,
            component_types: 32,
            max_systems: 16,
        }
    }
}

impl WorldConfig {
    /// Creates a config from explicit capacities.
    #[must_use]
    pub const fn new(max_entities: u32, component_types: u32, max_systems: u32) -> Self {
        Self {
            max_entities,
            component_types,
            max_systems,
        }
    }

    /// Parses and validates a config from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys, and
    /// [`ConfigError::Invalid`] if the capacities do not validate.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        tracing::debug!(?config, "loaded world config");
        Ok(config)
    }

    /// Checks that the capacities describe a usable world.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `max_entities` is zero or the
    /// per-entity component table would not fit in memory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entities == 0 {
            return Err(ConfigError::Invalid(
                "max_entities must be greater than zero".to_string(),
            ));
        }

        let table = u64::from(self.max_entities) * u64::from(self.component_types);
        if usize::try_from(table).is_err() {
            return Err(ConfigError::Invalid(format!(
                "component table of {table} entries does not fit in memory"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = WorldConfig::from_toml_str(
            "max_entities = 64\ncomponent_types = 4\nmax_systems = 2\n",
        )
        .unwrap();
        assert_eq!(config, WorldConfig::new(64, 4, 2));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = WorldConfig::from_toml_str("max_entities = 10").unwrap();
        assert_eq!(config.max_entities, 10);
        assert_eq!(config.component_types, WorldConfig::default().component_types);
        assert_eq!(config.max_systems, WorldConfig::default().max_systems);
    }

    #[test]
    fn test_rejects_zero_entities() {
        let err = WorldConfig::from_toml_str("max_entities = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(WorldConfig::new(0, 1, 1).validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            WorldConfig::from_toml_str("max_entities = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("max_entity = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
