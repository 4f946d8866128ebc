//! Patrol: начальный state: замкнутый маршрут с паузами на точках.

use bevy::math::Vec2;

use crate::agent::Sighting;
use crate::ai::states::{heard_footstep, raise_alert, AgentState, StateKind, Transition, ARRIVE_DISTANCE};
use crate::ai::{AgentMessage, StateContext};

#[derive(Debug, Clone, Default)]
pub struct PatrolState {
    /// Маршрут; пустой: строится вокруг home при входе
    pub points: Vec<Vec2>,
    index: usize,
    /// Оставшаяся пауза на текущей точке (ms)
    wait_timer: f32,
}

impl PatrolState {
    pub fn with_points(points: Vec<Vec2>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.points.get(self.index).copied()
    }

    pub fn is_waiting(&self) -> bool {
        self.wait_timer > 0.0
    }

    /// Ромб из четырёх точек вокруг home
    fn loop_around(home: Vec2, radius: f32) -> Vec<Vec2> {
        if radius <= 0.0 {
            return Vec::new();
        }
        vec![
            home + Vec2::new(radius, 0.0),
            home + Vec2::new(0.0, radius),
            home + Vec2::new(-radius, 0.0),
            home + Vec2::new(0.0, -radius),
        ]
    }

    fn advance(&mut self) {
        if !self.points.is_empty() {
            self.index = (self.index + 1) % self.points.len();
        }
    }

    fn walk(&mut self, ctx: &mut StateContext, dt: f32) {
        if self.wait_timer > 0.0 {
            self.wait_timer -= dt;
            ctx.stop();
            if self.wait_timer <= 0.0 {
                self.wait_timer = 0.0;
                self.advance();
            }
            return;
        }

        let Some(target) = self.current_waypoint() else {
            ctx.stop();
            return;
        };

        if ctx.distance_to(target) <= ARRIVE_DISTANCE {
            ctx.stop();
            let wait_time = ctx.body.archetype.params.wait_time;
            if wait_time > 0.0 {
                self.wait_timer = wait_time;
            } else {
                self.advance();
            }
            return;
        }

        let speed = ctx.body.speed();
        ctx.steer_towards(target, speed);
    }
}

impl AgentState for PatrolState {
    fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        if self.points.is_empty() {
            self.points = Self::loop_around(ctx.body.home, ctx.body.archetype.params.patrol_radius);
            self.index = 0;
        }
        self.wait_timer = 0.0;
        // Стимулы прошлой погони не должны сразу выдернуть из патруля
        ctx.body.hearing.clear_sounds();
        ctx.stop();
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, dt: f32) -> Transition {
        if let Some(player) = ctx.visible_player() {
            ctx.remember_player(player);
            raise_alert(ctx, player);
            return Transition::Change(StateKind::Chase);
        }

        if heard_footstep(ctx).is_some() {
            return Transition::Change(StateKind::Chase);
        }

        // Любой другой звук: повод обыскать место
        let now = ctx.now();
        if let Some(origin) = ctx.body.hearing.latest_sound(now).map(|sound| sound.origin) {
            if ctx.has_state(StateKind::Alert) {
                ctx.body.memory.investigate = Some(origin);
                ctx.body.memory.log_alert(origin, now);
                return Transition::Change(StateKind::Alert);
            }
        }

        self.walk(ctx, dt);
        Transition::Stay
    }

    fn handle_message(&mut self, ctx: &mut StateContext, message: &AgentMessage) -> Option<Transition> {
        match message {
            AgentMessage::Alert { player_position, .. } => {
                if !ctx.has_state(StateKind::Alert) {
                    return None;
                }
                ctx.body.memory.investigate = Some(*player_position);
                Some(Transition::Change(StateKind::Alert))
            }
            AgentMessage::ShareSighting(sighting) => {
                if !ctx.has_state(StateKind::Alert) {
                    return None;
                }
                ctx.body.memory.investigate = Some(sighting.position);
                Some(Transition::Change(StateKind::Alert))
            }
            AgentMessage::Damaged { source, .. } => {
                if let Some(source) = source {
                    let now = ctx.now();
                    ctx.body.memory.remember_player(Sighting {
                        position: *source,
                        timestamp: now,
                    });
                }
                Some(Transition::Change(StateKind::Chase))
            }
            AgentMessage::Inspire { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agent::{AgentBody, AgentId, Archetype};
    use crate::ai::{StateSet, WorldSnapshot};

    #[test]
    fn test_walks_waypoints_and_waits() {
        let archetype = Arc::new(Archetype::grunt());
        let mut body = AgentBody::new(AgentId(0), archetype, Vec2::ZERO, 1);
        let world = WorldSnapshot::new(0.0, None);
        let mut outbox = Vec::new();
        let registered = StateSet::from_kinds(&[StateKind::Patrol, StateKind::Chase]);
        let mut ctx = StateContext::new(&mut body, &world, &mut outbox, registered, Some(StateKind::Patrol));

        let mut patrol = PatrolState::with_points(vec![Vec2::new(5.0, 0.0), Vec2::new(50.0, 0.0)]);
        patrol.enter(&mut ctx);
        assert_eq!(patrol.current_waypoint(), Some(Vec2::new(5.0, 0.0)));

        // Уже в ARRIVE_DISTANCE от первой точки → пауза wait_time
        assert_eq!(patrol.update(&mut ctx, 16.0), Transition::Stay);
        assert!(patrol.is_waiting());
        assert_eq!(ctx.body.velocity, Vec2::ZERO);

        patrol.update(&mut ctx, 1000.0);
        assert!(!patrol.is_waiting());
        assert_eq!(patrol.current_waypoint(), Some(Vec2::new(50.0, 0.0)));

        patrol.update(&mut ctx, 16.0);
        assert!(ctx.body.velocity.x > 0.0);
    }

    #[test]
    fn test_loop_is_generated_around_home() {
        let archetype = Arc::new(Archetype::grunt());
        let mut body = AgentBody::new(AgentId(0), archetype, Vec2::new(10.0, 10.0), 1);
        let world = WorldSnapshot::new(0.0, None);
        let mut outbox = Vec::new();
        let mut ctx = StateContext::new(&mut body, &world, &mut outbox, StateSet::EMPTY, None);

        let mut patrol = PatrolState::default();
        patrol.enter(&mut ctx);
        assert_eq!(patrol.points.len(), 4);
        assert_eq!(patrol.current_waypoint(), Some(Vec2::new(110.0, 10.0)));
    }
}
