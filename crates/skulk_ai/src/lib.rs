//! Skulk enemy AI
//!
//! Per-agent state machine + perception (vision cone, hearing с TTL) +
//! координация стаи/команды. Симуляция однопоточная и tick-driven:
//! хост вызывает `AgentManager::update(dt)` раз в кадр (или через
//! `EnemyAiPlugin` в FixedUpdate).
//!
//! Внешний мир (игрок, рендер, физика) подключается через узкие интерфейсы:
//! `PlayerTarget`, velocity агента, `FeedbackEvent`.

pub mod agent;
pub mod ai;
pub mod config;
pub mod feedback;
pub mod geometry;
pub mod logger;
pub mod manager;
pub mod perception;
pub mod player;
pub mod plugin;

pub use agent::{Agent, AgentId, Archetype, ArchetypeParams, ArchetypeTable, Role};
pub use ai::{AgentCommand, AgentMessage, StateKind, StateMachine, Transition, WorldSnapshot};
pub use config::{AiConfig, ConfigError, ManagerConfig};
pub use feedback::{FeedbackEvent, TintColor};
pub use manager::{AgentManager, SpawnPoint};
pub use perception::{HearingSystem, SoundEvent, VisionSystem};
pub use player::{PlayerTarget, SimPlayer};
pub use plugin::{create_headless_app, create_headless_app_with_config, AiFeedback, EnemyAiPlugin};
