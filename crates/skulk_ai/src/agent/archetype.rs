//! Archetypes: именованные пресеты (stats + набор states) вместо иерархии классов
//!
//! Один конкретный `Agent` + таблица `{params, states, initial_state}`.

use std::collections::BTreeMap;
use std::f32::consts::PI;
use std::sync::Arc;

use serde::Deserialize;

use crate::ai::{StateKind, StateSet};
use crate::config::{ArchetypeConfig, ConfigError};

/// Роль в координации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Solo,
    /// Pack bonus от соседей того же archetype
    Pack,
    /// Обмен памятью о игроке с командой
    Team,
}

/// Числовые параметры archetype. Время в ms, дистанции в world units,
/// скорость в units/sec, углы в радианах.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArchetypeParams {
    pub role: Role,
    pub team: u32,
    pub pool_size: usize,

    // Base stats
    pub max_health: f32,
    pub speed: f32,
    pub contact_damage: f32,

    // Perception
    pub view_distance: f32,
    pub view_angle: f32,
    pub hearing_range: f32,

    // Combat
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub windup: f32,
    pub knockback: f32,

    // Patrol / Chase / Alert
    pub patrol_radius: f32,
    pub wait_time: f32,
    pub lose_target_time: f32,
    pub alert_duration: f32,
    pub alert_radius: f32,
    pub search_radius: f32,

    // Coordination
    pub pack_range: f32,
    pub comm_range: f32,
    pub surround_radius: f32,

    // Berserk
    pub berserk_threshold: f32,
    pub berserk_duration: f32,
    pub rage_multiplier: f32,
    pub inspire_radius: f32,
    pub inspire_multiplier: f32,
    pub inspire_duration: f32,

    // Fear
    pub fear_distance: f32,
    pub fear_duration: f32,

    // Disguise
    pub trigger_distance: f32,
    pub burst_radius: f32,
}

impl Default for ArchetypeParams {
    fn default() -> Self {
        Self {
            role: Role::Solo,
            team: 0,
            pool_size: 10,

            max_health: 100.0,
            speed: 80.0,
            contact_damage: 10.0,

            view_distance: 200.0,
            view_angle: PI / 2.0,
            hearing_range: 250.0,

            attack_range: 60.0,
            attack_cooldown: 1000.0,
            windup: 200.0,
            knockback: 200.0,

            patrol_radius: 100.0,
            wait_time: 1000.0,
            lose_target_time: 3000.0,
            alert_duration: 5000.0,
            alert_radius: 250.0,
            search_radius: 120.0,

            pack_range: 200.0,
            comm_range: 300.0,
            surround_radius: 50.0,

            berserk_threshold: 0.3,
            berserk_duration: 5000.0,
            rage_multiplier: 1.5,
            inspire_radius: 250.0,
            inspire_multiplier: 1.2,
            inspire_duration: 3000.0,

            fear_distance: 100.0,
            fear_duration: 3000.0,

            trigger_distance: 80.0,
            burst_radius: 100.0,
        }
    }
}

/// Провалидированный archetype
#[derive(Debug, Clone, PartialEq)]
pub struct Archetype {
    pub name: String,
    pub params: ArchetypeParams,
    pub states: StateSet,
    pub initial_state: StateKind,
    /// Регистрировать ли global `Monitor` state
    pub global_state: bool,
}

const BASIC: &[StateKind] = &[StateKind::Patrol, StateKind::Chase, StateKind::Attack, StateKind::Alert];

impl Archetype {
    pub fn new(name: impl Into<String>, params: ArchetypeParams, states: &[StateKind]) -> Self {
        Self {
            name: name.into(),
            params,
            states: StateSet::from_kinds(states),
            initial_state: StateKind::Patrol,
            global_state: false,
        }
    }

    pub fn with_initial_state(mut self, state: StateKind) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_global_state(mut self) -> Self {
        self.global_state = true;
        self
    }

    pub fn from_config(name: &str, config: &ArchetypeConfig) -> Result<Self, ConfigError> {
        let mut states = StateSet::EMPTY;
        for state_name in &config.states {
            let kind = StateKind::from_name(state_name).ok_or_else(|| ConfigError::UnknownState {
                archetype: name.to_string(),
                state: state_name.clone(),
            })?;
            if kind == StateKind::Monitor {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.states", name),
                    reason: "'monitor' is a global state, use global_state = true".to_string(),
                });
            }
            states.insert(kind);
        }

        let initial_state =
            StateKind::from_name(&config.initial_state).ok_or_else(|| ConfigError::UnknownState {
                archetype: name.to_string(),
                state: config.initial_state.clone(),
            })?;
        if !states.contains(initial_state) {
            return Err(ConfigError::MissingInitialState {
                archetype: name.to_string(),
                state: config.initial_state.clone(),
            });
        }

        validate_params(name, &config.params)?;

        Ok(Self {
            name: name.to_string(),
            params: config.params.clone(),
            states,
            initial_state,
            global_state: config.global_state,
        })
    }

    /// Базовый враг: patrol → chase → attack, alert от союзников
    pub fn grunt() -> Self {
        Self::new("grunt", ArchetypeParams::default(), BASIC)
    }

    /// Стайный: pack bonus + окружение игрока
    pub fn wolf() -> Self {
        let params = ArchetypeParams {
            role: Role::Pack,
            team: 1,
            max_health: 60.0,
            speed: 110.0,
            contact_damage: 8.0,
            view_angle: PI * 2.0 / 3.0,
            lose_target_time: 4000.0,
            ..ArchetypeParams::default()
        };
        let mut states = BASIC.to_vec();
        states.push(StateKind::Surround);
        Self::new("wolf", params, &states).with_global_state()
    }

    /// Командный: делится памятью о игроке, поднимает тревогу
    pub fn soldier() -> Self {
        let params = ArchetypeParams {
            role: Role::Team,
            team: 2,
            max_health: 120.0,
            view_distance: 250.0,
            ..ArchetypeParams::default()
        };
        Self::new("soldier", params, BASIC).with_global_state()
    }

    pub fn berserker() -> Self {
        let params = ArchetypeParams {
            max_health: 150.0,
            speed: 70.0,
            contact_damage: 15.0,
            ..ArchetypeParams::default()
        };
        let mut states = BASIC.to_vec();
        states.push(StateKind::Berserk);
        Self::new("berserker", params, &states).with_global_state()
    }

    pub fn coward() -> Self {
        let params = ArchetypeParams {
            max_health: 50.0,
            speed: 90.0,
            contact_damage: 5.0,
            ..ArchetypeParams::default()
        };
        let mut states = BASIC.to_vec();
        states.push(StateKind::Fear);
        Self::new("coward", params, &states).with_global_state()
    }

    /// Мимик: неподвижен и замаскирован до reveal
    pub fn mimic() -> Self {
        let params = ArchetypeParams {
            max_health: 80.0,
            speed: 100.0,
            contact_damage: 20.0,
            ..ArchetypeParams::default()
        };
        let states = [
            StateKind::Disguise,
            StateKind::Reveal,
            StateKind::Patrol,
            StateKind::Chase,
            StateKind::Attack,
        ];
        Self::new("mimic", params, &states).with_initial_state(StateKind::Disguise)
    }
}

fn validate_params(name: &str, params: &ArchetypeParams) -> Result<(), ConfigError> {
    // Углы намеренно не проверяются на диапазон [0, 2π]
    let checks = [
        ("max_health", params.max_health),
        ("speed", params.speed),
        ("contact_damage", params.contact_damage),
        ("view_distance", params.view_distance),
        ("hearing_range", params.hearing_range),
        ("attack_range", params.attack_range),
        ("attack_cooldown", params.attack_cooldown),
        ("windup", params.windup),
        ("lose_target_time", params.lose_target_time),
        ("alert_duration", params.alert_duration),
        ("berserk_duration", params.berserk_duration),
        ("fear_duration", params.fear_duration),
    ];

    for (field, value) in checks {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.{}", name, field),
                reason: format!("must be finite and non-negative, got {}", value),
            });
        }
    }

    if params.pool_size == 0 {
        return Err(ConfigError::InvalidValue {
            field: format!("{}.pool_size", name),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Таблица archetypes по имени
#[derive(Debug, Clone, Default)]
pub struct ArchetypeTable {
    archetypes: BTreeMap<String, Arc<Archetype>>,
}

impl ArchetypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::new();
        for archetype in [
            Archetype::grunt(),
            Archetype::wolf(),
            Archetype::soldier(),
            Archetype::berserker(),
            Archetype::coward(),
            Archetype::mimic(),
        ] {
            table.register(archetype);
        }
        table
    }

    /// Регистрирует (или заменяет) archetype
    pub fn register(&mut self, archetype: Archetype) {
        self.archetypes.insert(archetype.name.clone(), Arc::new(archetype));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Archetype>> {
        self.archetypes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
