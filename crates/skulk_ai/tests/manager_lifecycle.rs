//! Жизненный цикл популяции: cap, пулы, смерть, автоспавн

use bevy::math::Vec2;
use skulk_ai::logger::{set_logger, LogLevel, MemoryLogger};
use skulk_ai::*;

fn manager_with(config: ManagerConfig) -> AgentManager {
    AgentManager::new(config, ArchetypeTable::builtin())
}

#[test]
fn test_spawn_respects_population_cap() {
    let mut manager = manager_with(ManagerConfig {
        population_cap: 2,
        ..ManagerConfig::default()
    });

    assert!(manager.spawn_agent(Vec2::ZERO, "grunt").is_some());
    assert!(manager.spawn_agent(Vec2::new(10.0, 0.0), "wolf").is_some());
    assert!(manager.spawn_agent(Vec2::new(20.0, 0.0), "grunt").is_none());
    assert_eq!(manager.len(), 2);
}

#[test]
fn test_unknown_archetype_is_rejected() {
    let mut manager = manager_with(ManagerConfig::default());
    assert!(manager.spawn_agent(Vec2::ZERO, "dragon").is_none());
    assert!(manager.is_empty());
    assert!(!manager.add_spawn_point(Vec2::ZERO, "dragon"));
}

#[test]
fn test_pool_size_limits_instances() {
    let mut manager = manager_with(ManagerConfig::default());
    let params = ArchetypeParams {
        pool_size: 1,
        ..ArchetypeParams::default()
    };
    manager.register_archetype(Archetype::new("boss", params, &[StateKind::Patrol, StateKind::Chase]));

    let boss = manager.spawn_agent(Vec2::ZERO, "boss").unwrap();
    assert!(manager.spawn_agent(Vec2::new(10.0, 0.0), "boss").is_none());

    // Смерть возвращает экземпляр в пул: снова можно спавнить
    assert!(manager.damage_agent(boss, 1000.0, None));
    manager.update(16.0, None);
    assert_eq!(manager.pooled("boss"), 1);
    assert!(manager.spawn_agent(Vec2::new(10.0, 0.0), "boss").is_some());
    assert_eq!(manager.pooled("boss"), 0);
}

#[test]
fn test_dead_agents_are_recycled_fresh() {
    let mut manager = manager_with(ManagerConfig::default());
    let first = manager.spawn_agent(Vec2::ZERO, "grunt").unwrap();

    assert!(!manager.damage_agent(first, 40.0, None));
    assert_eq!(manager.agent(first).unwrap().state(), Some(StateKind::Chase));
    assert!(manager.damage_agent(first, 60.0, None));
    assert!(!manager.agent(first).unwrap().is_alive());
    assert!(manager
        .drain_feedback()
        .iter()
        .any(|event| matches!(event, FeedbackEvent::Died { agent, .. } if *agent == first)));

    manager.update(16.0, None);
    assert!(manager.agent(first).is_none());
    assert_eq!(manager.pooled("grunt"), 1);

    let second = manager.spawn_agent(Vec2::new(40.0, 40.0), "grunt").unwrap();
    assert_ne!(first, second);
    let agent = manager.agent(second).unwrap();
    assert_eq!(agent.body.health.current, agent.body.health.max);
    assert_eq!(agent.state(), Some(StateKind::Patrol));
    assert_eq!(agent.position(), Vec2::new(40.0, 40.0));
    assert!(agent.body.memory.last_player.is_none());
}

#[test]
fn test_recycled_agent_picks_up_replaced_archetype() {
    let mut manager = manager_with(ManagerConfig::default());
    let first = manager.spawn_agent(Vec2::ZERO, "grunt").unwrap();
    assert!(manager.damage_agent(first, 1000.0, None));
    manager.update(16.0, None);
    assert_eq!(manager.pooled("grunt"), 1);

    let params = ArchetypeParams {
        speed: 999.0,
        ..ArchetypeParams::default()
    };
    manager.register_archetype(Archetype::new(
        "grunt",
        params,
        &[StateKind::Patrol, StateKind::Chase, StateKind::Attack, StateKind::Alert, StateKind::Fear],
    ));

    let second = manager.spawn_agent(Vec2::ZERO, "grunt").unwrap();
    assert_eq!(manager.pooled("grunt"), 0);
    let agent = manager.agent(second).unwrap();
    assert_eq!(agent.speed(), 999.0);
    assert!(agent.state_machine().registered().contains(StateKind::Fear));
}

#[test]
fn test_spawn_warns_when_initial_state_is_not_registered() {
    let logger = MemoryLogger::new();
    set_logger(Box::new(logger.clone()));

    let mut manager = manager_with(ManagerConfig::default());
    // Archetype::new ставит Patrol начальным, но Patrol не зарегистрирован
    manager.register_archetype(Archetype::new("statue", ArchetypeParams::default(), &[StateKind::Chase]));

    let id = manager.spawn_agent(Vec2::ZERO, "statue").unwrap();
    assert_eq!(manager.agent(id).unwrap().state(), None);
    assert!(logger.contains(LogLevel::Warning, "initial state 'patrol' not entered"));
}

#[test]
fn test_despawn_flag_removes_agent() {
    let mut manager = manager_with(ManagerConfig::default());
    let id = manager.spawn_agent(Vec2::ZERO, "grunt").unwrap();

    assert!(manager.despawn(id));
    assert!(manager.agent(id).is_some());
    manager.update(16.0, None);
    assert!(manager.agent(id).is_none());
    assert!(!manager.despawn(id));
}

#[test]
fn test_spawn_cadence_and_distance_from_player() {
    let mut manager = manager_with(ManagerConfig {
        spawn_interval: 1000.0,
        min_spawn_distance: 300.0,
        ..ManagerConfig::default()
    });
    manager.add_spawn_point(Vec2::new(500.0, 0.0), "grunt");
    let mut player = SimPlayer::new(Vec2::ZERO);

    manager.update(500.0, Some(&mut player));
    assert_eq!(manager.len(), 0);
    manager.update(500.0, Some(&mut player));
    assert_eq!(manager.len(), 1);
    manager.update(500.0, Some(&mut player));
    assert_eq!(manager.len(), 1);
    manager.update(500.0, Some(&mut player));
    assert_eq!(manager.len(), 2);

    // Игрок рядом с единственной точкой: спавна нет
    player.position = Vec2::new(450.0, 0.0);
    for _ in 0..4 {
        manager.update(500.0, Some(&mut player));
    }
    assert_eq!(manager.len(), 2);
}

#[test]
fn test_spawn_without_player_uses_any_point() {
    let mut manager = manager_with(ManagerConfig {
        spawn_interval: 100.0,
        ..ManagerConfig::default()
    });
    manager.add_spawn_point(Vec2::ZERO, "wolf");

    manager.update(100.0, None);
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.agents().next().unwrap().archetype().name, "wolf");
}

#[test]
fn test_emit_sound_reaches_listeners_in_range() {
    let mut manager = manager_with(ManagerConfig::default());
    manager.spawn_agent(Vec2::ZERO, "grunt");
    manager.spawn_agent(Vec2::new(1000.0, 0.0), "grunt");

    assert_eq!(manager.emit_sound(Vec2::new(100.0, 0.0), 1.0, "footstep"), 1);
    // volume < 1 сужает радиус слышимости
    assert_eq!(manager.emit_sound(Vec2::new(200.0, 0.0), 0.5, "footstep"), 0);
}

#[test]
fn test_manager_from_config() {
    let source = r#"
        [manager]
        population_cap = 3
        seed = 9

        [[manager.spawn_points]]
        x = 400.0
        y = 0.0
        archetype = "scout"

        [archetypes.scout]
        speed = 150.0
        view_distance = 300.0
    "#;
    let config = AiConfig::from_toml_str(source).unwrap();
    let mut manager = AgentManager::from_config(&config).unwrap();

    assert_eq!(manager.population_cap(), 3);
    assert_eq!(manager.spawn_points().len(), 1);
    let id = manager.spawn_agent(Vec2::ZERO, "scout").unwrap();
    assert_eq!(manager.agent(id).unwrap().speed(), 150.0);
}
