//! Bevy glue: AgentManager как resource, тик в FixedUpdate
//!
//! Порядок систем (chain, детерминированно):
//! 1. tick_agents: `AgentManager::update` с шагом `Time<Fixed>`
//! 2. apply_agent_velocities: headless интеграция скоростей
//! 3. apply_player_knockback: knockback от ударов двигает SimPlayer
//! 4. publish_feedback: feedback → Bevy events для хоста

use bevy::prelude::*;

use crate::config::{AiConfig, ConfigError, ManagerConfig};
use crate::feedback::FeedbackEvent;
use crate::logger::init_logger;
use crate::manager::AgentManager;
use crate::player::{PlayerTarget, SimPlayer};
use crate::agent::ArchetypeTable;

/// Feedback от AI (tint, flash, shake...) для рендера/звука
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AiFeedback(pub FeedbackEvent);

pub struct EnemyAiPlugin;

impl Plugin for EnemyAiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AiFeedback>().add_systems(
            FixedUpdate,
            (
                tick_agents,
                apply_agent_velocities,
                apply_player_knockback,
                publish_feedback,
            )
                .chain(),
        );
    }
}

/// Шаг симуляции в ms. Берём timestep, а не delta: при ручном запуске
/// FixedUpdate delta не выставляется.
fn fixed_step_ms(time: &Time<Fixed>) -> f32 {
    time.timestep().as_secs_f32() * 1000.0
}

pub fn tick_agents(time: Res<Time<Fixed>>, mut manager: ResMut<AgentManager>, player: Option<ResMut<SimPlayer>>) {
    let dt = fixed_step_ms(&time);
    match player {
        Some(mut player) => {
            let target: &mut dyn PlayerTarget = &mut *player;
            manager.update(dt, Some(target));
        }
        None => manager.update(dt, None),
    }
}

pub fn apply_agent_velocities(time: Res<Time<Fixed>>, mut manager: ResMut<AgentManager>) {
    let dt = fixed_step_ms(&time);
    manager.integrate_velocities(dt);
}

pub fn apply_player_knockback(player: Option<ResMut<SimPlayer>>) {
    let Some(mut player) = player else {
        return;
    };
    if player.knockback != Vec2::ZERO {
        let knockback = player.knockback;
        player.position += knockback;
        player.knockback = Vec2::ZERO;
    }
}

pub fn publish_feedback(mut manager: ResMut<AgentManager>, mut events: EventWriter<AiFeedback>) {
    for event in manager.drain_feedback() {
        events.write(AiFeedback(event));
    }
}

/// Minimal Bevy App для headless симуляции: 60Hz FixedUpdate, builtin
/// archetypes, SimPlayer в начале координат.
pub fn create_headless_app(seed: u64) -> App {
    let config = ManagerConfig {
        seed,
        ..ManagerConfig::default()
    };
    build_app(AgentManager::new(config, ArchetypeTable::builtin()))
}

/// То же, но менеджер собирается из конфига
pub fn create_headless_app_with_config(config: &AiConfig) -> Result<App, ConfigError> {
    Ok(build_app(AgentManager::from_config(config)?))
}

fn build_app(manager: AgentManager) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .insert_resource(manager)
        .insert_resource(SimPlayer::new(Vec2::ZERO))
        .add_plugins(EnemyAiPlugin);

    app
}
