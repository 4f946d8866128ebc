//! Конфигурация AI: параметры менеджера + таблица archetypes (TOML)
//!
//! ```toml
//! [manager]
//! population_cap = 12
//! seed = 7
//!
//! [[manager.spawn_points]]
//! x = 400.0
//! y = 0.0
//! archetype = "wolf"
//!
//! [archetypes.brute]
//! states = ["patrol", "chase", "attack", "berserk"]
//! global_state = true
//! max_health = 300.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::agent::{Archetype, ArchetypeParams, ArchetypeTable};
use crate::logger::LogLevel;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("archetype '{archetype}' references unknown state '{state}'")]
    UnknownState { archetype: String, state: String },

    #[error("archetype '{archetype}': initial state '{state}' is not in its state list")]
    MissingInitialState { archetype: String, state: String },

    #[error("spawn point references unknown archetype '{0}'")]
    UnknownArchetype(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnPointConfig {
    pub x: f32,
    pub y: f32,
    pub archetype: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Максимум живых агентов одновременно
    pub population_cap: usize,
    /// Пауза между автоспавнами (ms)
    pub spawn_interval: f32,
    /// Spawn point должен быть дальше этого от игрока
    pub min_spawn_distance: f32,
    pub seed: u64,
    pub log_level: LogLevel,
    pub spawn_points: Vec<SpawnPointConfig>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            population_cap: 20,
            spawn_interval: 3000.0,
            min_spawn_distance: 300.0,
            seed: 42,
            log_level: LogLevel::Info,
            spawn_points: Vec::new(),
        }
    }
}

fn default_states() -> Vec<String> {
    ["patrol", "chase", "attack", "alert"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_initial_state() -> String {
    "patrol".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchetypeConfig {
    #[serde(default = "default_states")]
    pub states: Vec<String>,
    #[serde(default = "default_initial_state")]
    pub initial_state: String,
    #[serde(default)]
    pub global_state: bool,
    #[serde(flatten)]
    pub params: ArchetypeParams,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub manager: ManagerConfig,
    pub archetypes: BTreeMap<String, ArchetypeConfig>,
}

impl AiConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AiConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Builtin archetypes + из конфига (одноимённые заменяют builtin)
    pub fn archetype_table(&self) -> Result<ArchetypeTable, ConfigError> {
        let mut table = ArchetypeTable::builtin();
        for (name, archetype) in &self.archetypes {
            table.register(Archetype::from_config(name, archetype)?);
        }
        Ok(table)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let table = self.archetype_table()?;

        for point in &self.manager.spawn_points {
            if table.get(&point.archetype).is_none() {
                return Err(ConfigError::UnknownArchetype(point.archetype.clone()));
            }
        }

        if !self.manager.spawn_interval.is_finite() || self.manager.spawn_interval < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "manager.spawn_interval".to_string(),
                reason: format!("must be finite and non-negative, got {}", self.manager.spawn_interval),
            });
        }
        Ok(())
    }
}
