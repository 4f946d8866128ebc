//! Сценарии переходов states через AgentManager
//!
//! Проверяем:
//! - Patrol → Chase по зрению и по звуку шагов
//! - Chase → Attack на дистанции < 60
//! - Chase → Patrol по таймауту
//! - Alert → Patrol по истечении поиска, Alert → Chase по зрению
//! - Attack: один удар на завершённый windup, повторная проверка дистанции
//! - Disguise → Reveal → Chase, Fear и Berserk

use std::sync::Arc;

use bevy::math::Vec2;
use skulk_ai::agent::Agent;
use skulk_ai::ai::states::State;
use skulk_ai::geometry::direction;
use skulk_ai::*;

fn manager() -> AgentManager {
    let mut table = ArchetypeTable::builtin();
    let params = ArchetypeParams {
        view_distance: 120.0,
        ..ArchetypeParams::default()
    };
    table.register(Archetype::new(
        "sentry",
        params,
        &[StateKind::Patrol, StateKind::Chase, StateKind::Attack, StateKind::Alert],
    ));
    AgentManager::new(ManagerConfig::default(), table)
}

fn tick(manager: &mut AgentManager, player: &mut SimPlayer, dt: f32) {
    manager.update(dt, Some(player));
}

fn state_of(manager: &AgentManager, id: AgentId) -> Option<&'static str> {
    manager.agent(id).and_then(Agent::state_name)
}

#[test]
fn test_patrol_to_chase_on_sight() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(50.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    assert_eq!(state_of(&manager, id), Some("patrol"));

    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));
}

#[test]
fn test_player_outside_view_distance_is_ignored() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(130.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("patrol"));
}

#[test]
fn test_patrol_to_chase_on_faint_footstep() {
    let mut manager = manager();
    // Игрок за спиной: не виден
    let mut player = SimPlayer::new(Vec2::new(-100.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("patrol"));

    // 250 * 0.5 = 125 ≥ 100: звук принят, дальше верификации нет
    assert_eq!(manager.emit_sound(Vec2::new(-100.0, 0.0), 0.5, "footstep"), 1);
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));

    let agent = manager.agent(id).unwrap();
    assert_eq!(agent.body.memory.last_player.unwrap().position, Vec2::new(-100.0, 0.0));
}

#[test]
fn test_other_sound_starts_investigation() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(-400.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    manager.emit_sound(Vec2::new(0.0, -150.0), 1.0, "glass");
    tick(&mut manager, &mut player, 16.0);

    assert_eq!(state_of(&manager, id), Some("alert"));
    match manager.agent(id).unwrap().state_machine().state(StateKind::Alert) {
        Some(State::Alert(alert)) => assert_eq!(alert.center(), Vec2::new(0.0, -150.0)),
        other => panic!("unexpected state {:?}", other),
    }
}

#[test]
fn test_alert_decays_back_to_patrol() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(-400.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    manager.emit_sound(Vec2::new(0.0, -150.0), 1.0, "glass");
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("alert"));

    // alert_duration = 5000: четыре секунды ещё в поиске
    for _ in 0..4 {
        tick(&mut manager, &mut player, 1000.0);
        assert_eq!(state_of(&manager, id), Some("alert"));
    }
    tick(&mut manager, &mut player, 1000.0);
    assert_eq!(state_of(&manager, id), Some("patrol"));
}

#[test]
fn test_alert_escalates_to_chase_on_sight() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(-400.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    manager.emit_sound(Vec2::new(0.0, -150.0), 1.0, "glass");
    tick(&mut manager, &mut player, 16.0);
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("alert"));

    // Игрок выходит прямо перед агентом, куда бы тот ни смотрел при обыске
    let agent = manager.agent(id).unwrap();
    let ahead = agent.position() + direction(agent.body.vision.facing_direction) * 50.0;
    player.position = ahead;
    tick(&mut manager, &mut player, 16.0);

    assert_eq!(state_of(&manager, id), Some("chase"));
    let agent = manager.agent(id).unwrap();
    assert_eq!(agent.body.memory.last_player.unwrap().position, ahead);
}

#[test]
fn test_chase_to_attack_within_engage_distance() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(50.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));

    player.position = Vec2::new(59.0, 0.0);
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("attack"));
}

#[test]
fn test_chase_times_out_to_patrol() {
    let archetype = Arc::new(Archetype::grunt());
    let mut agent = Agent::new(AgentId(0), archetype, Vec2::ZERO, 7);
    // Игрок существует, но за спиной агента
    let world = WorldSnapshot::with_player(0.0, Vec2::new(-150.0, 0.0));
    let mut outbox = Vec::new();

    agent.start(&world, &mut outbox);
    assert!(agent.change_state(StateKind::Chase, &world, &mut outbox));
    assert!(agent.body.memory.last_player.is_none());

    // 1000 * 3 == lose_target_time
    for _ in 0..3 {
        agent.update(1000.0, &world, &mut outbox);
        assert_eq!(agent.state(), Some(StateKind::Chase));
    }

    agent.update(16.0, &world, &mut outbox);
    assert_eq!(agent.state(), Some(StateKind::Patrol));
}

#[test]
fn test_chase_walks_to_last_known_position_then_forgets_it() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(100.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));

    // Игрок ушёл из поля зрения: агент идёт к последней позиции
    player.position = Vec2::new(-300.0, 0.0);
    tick(&mut manager, &mut player, 16.0);
    let velocity = manager.agent(id).unwrap().velocity();
    assert!(velocity.x > 0.0);

    manager.set_agent_position(id, Vec2::new(95.0, 0.0));
    tick(&mut manager, &mut player, 16.0);
    let agent = manager.agent(id).unwrap();
    assert!(agent.body.memory.last_player.is_none());
    assert_eq!(agent.velocity(), Vec2::ZERO);
    assert_eq!(agent.state(), Some(StateKind::Chase));
}

#[test]
fn test_attack_hits_once_per_windup() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(30.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    tick(&mut manager, &mut player, 16.0);
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("attack"));
    manager.drain_feedback();

    // Cooldown 1000: на втором update(500) начинается windup, урона ещё нет
    tick(&mut manager, &mut player, 500.0);
    assert_eq!(player.hits_taken, 0);
    tick(&mut manager, &mut player, 500.0);
    assert_eq!(player.hits_taken, 0);
    assert!(manager
        .drain_feedback()
        .iter()
        .any(|event| matches!(event, FeedbackEvent::AttackWindup { agent } if *agent == id)));

    // Windup 200 → один удар
    tick(&mut manager, &mut player, 100.0);
    assert_eq!(player.hits_taken, 0);
    tick(&mut manager, &mut player, 100.0);
    assert_eq!(player.hits_taken, 1);
    assert_eq!(player.health.current, 90.0);
    assert!(player.knockback.x > 0.0);

    // Несколько коротких тиков без нового cooldown: повторного удара нет
    for _ in 0..10 {
        tick(&mut manager, &mut player, 16.0);
    }
    assert_eq!(player.hits_taken, 1);
}

#[test]
fn test_attack_rechecks_range_at_resolution() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(30.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    tick(&mut manager, &mut player, 16.0);
    tick(&mut manager, &mut player, 16.0);
    tick(&mut manager, &mut player, 1000.0);

    // Игрок отступил за attack_range (60), но не дальше 90: агент остаётся в Attack
    player.position = Vec2::new(80.0, 0.0);
    tick(&mut manager, &mut player, 200.0);
    assert_eq!(player.hits_taken, 0);
    assert_eq!(state_of(&manager, id), Some("attack"));

    // Дальше 1.5 * attack_range: назад в Chase
    player.position = Vec2::new(95.0, 0.0);
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));
}

#[test]
fn test_missing_player_returns_chase_to_patrol() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(50.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "sentry").unwrap();
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));

    manager.update(16.0, None);
    assert_eq!(state_of(&manager, id), Some("patrol"));
}

#[test]
fn test_mimic_reveals_irreversibly() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(200.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "mimic").unwrap();
    assert_eq!(state_of(&manager, id), Some("disguise"));
    assert!(manager.agent(id).unwrap().body.disguised);

    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("disguise"));

    player.position = Vec2::new(50.0, 0.0);
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("reveal"));
    // Burst задевает игрока в burst_radius
    assert_eq!(player.hits_taken, 1);
    assert!(manager
        .drain_feedback()
        .iter()
        .any(|event| matches!(event, FeedbackEvent::RevealBurst { .. })));

    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));

    let snapshot = manager.snapshot();
    let mut outbox = Vec::new();
    let agent = manager.agent_mut(id).unwrap();
    agent.change_state(StateKind::Disguise, &snapshot, &mut outbox);
    assert_eq!(agent.state(), Some(StateKind::Chase));
    assert!(agent.body.revealed);
    assert!(!agent.body.disguised);
}

#[test]
fn test_damage_reveals_mimic() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(300.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "mimic").unwrap();
    manager.damage_agent(id, 10.0, Some(Vec2::new(300.0, 0.0)));
    assert_eq!(state_of(&manager, id), Some("reveal"));

    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, id), Some("chase"));
}

#[test]
fn test_coward_flees_when_hurt() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(-150.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "coward").unwrap();
    manager.damage_agent(id, 5.0, Some(player.position));
    assert_eq!(state_of(&manager, id), Some("fear"));

    tick(&mut manager, &mut player, 16.0);
    let agent = manager.agent(id).unwrap();
    // Бежит прочь от игрока (jitter не больше π/6)
    assert!(agent.velocity().x > 0.0);

    // Игрок далеко: страх проходит за fear_duration
    for _ in 0..4 {
        tick(&mut manager, &mut player, 1000.0);
    }
    assert_eq!(state_of(&manager, id), Some("patrol"));
}

#[test]
fn test_fear_is_extended_while_player_is_close() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(-300.0, 0.0));

    let id = manager.spawn_agent(Vec2::ZERO, "coward").unwrap();
    manager.damage_agent(id, 5.0, None);

    player.position = Vec2::new(-50.0, 0.0);
    for _ in 0..10 {
        manager.set_agent_position(id, Vec2::ZERO);
        tick(&mut manager, &mut player, 1000.0);
        assert_eq!(state_of(&manager, id), Some("fear"));
    }
}

#[test]
fn test_berserker_rages_and_inspires_kin() {
    let mut manager = manager();
    let mut player = SimPlayer::new(Vec2::new(-500.0, 0.0));

    let raging = manager.spawn_agent(Vec2::ZERO, "berserker").unwrap();
    let kin = manager.spawn_agent(Vec2::new(100.0, 0.0), "berserker").unwrap();
    let stranger = manager.spawn_agent(Vec2::new(50.0, 0.0), "grunt").unwrap();

    manager.damage_agent(raging, 110.0, None);
    tick(&mut manager, &mut player, 16.0);
    assert_eq!(state_of(&manager, raging), Some("berserk"));

    let base_speed = manager.agent(raging).unwrap().archetype().params.speed;
    assert_eq!(manager.agent(raging).unwrap().speed(), base_speed * 1.5);
    assert_eq!(manager.agent(kin).unwrap().body.modifiers.inspire, 1.2);
    assert_eq!(manager.agent(stranger).unwrap().body.modifiers.inspire, 1.0);

    // По окончании berserk статы восстанавливаются; повторно не срабатывает
    for _ in 0..5 {
        tick(&mut manager, &mut player, 1000.0);
    }
    let agent = manager.agent(raging).unwrap();
    assert_ne!(agent.state(), Some(StateKind::Berserk));
    assert_eq!(agent.body.modifiers.rage, 1.0);
    assert!(agent.body.berserk_spent);
}
