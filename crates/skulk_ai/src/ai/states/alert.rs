//! Alert: ограниченный по времени случайный обыск вокруг точки тревоги

use bevy::math::Vec2;

use crate::ai::states::{heard_footstep, raise_alert, random_point_in_disk, AgentState, StateKind, Transition, ARRIVE_DISTANCE};
use crate::ai::{AgentMessage, StateContext};

/// Как часто выбирается новая точка обыска (ms)
const RETARGET_INTERVAL: f32 = 800.0;

/// Обыск идёт шагом
const SEARCH_SPEED_FACTOR: f32 = 0.7;

#[derive(Debug, Clone, Default)]
pub struct AlertState {
    center: Vec2,
    elapsed: f32,
    waypoint: Option<Vec2>,
    retarget: f32,
}

impl AlertState {
    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn refocus(&mut self, center: Vec2) {
        self.center = center;
        self.elapsed = 0.0;
        self.waypoint = None;
        self.retarget = 0.0;
    }

    fn pick_waypoint(&mut self, ctx: &mut StateContext) {
        let radius = ctx.body.archetype.params.search_radius;
        self.waypoint = Some(random_point_in_disk(ctx, self.center, radius));
        self.retarget = RETARGET_INTERVAL;
    }
}

impl AgentState for AlertState {
    fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        let center = ctx
            .body
            .memory
            .investigate
            .take()
            .or_else(|| ctx.body.memory.last_player.map(|sighting| sighting.position))
            .unwrap_or(ctx.body.position);
        self.refocus(center);
        self.pick_waypoint(ctx);
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

        self.elapsed += dt;
        if self.elapsed >= ctx.body.archetype.params.alert_duration {
            ctx.stop();
            return Transition::Change(StateKind::Patrol);
        }

        self.retarget -= dt;
        let arrived = self
            .waypoint
            .map_or(true, |waypoint| ctx.distance_to(waypoint) <= ARRIVE_DISTANCE);
        if arrived || self.retarget <= 0.0 {
            self.pick_waypoint(ctx);
        }

        if let Some(waypoint) = self.waypoint {
            let speed = ctx.body.speed() * SEARCH_SPEED_FACTOR;
            ctx.steer_towards(waypoint, speed);
        }
        Transition::Stay
    }

    fn handle_message(&mut self, ctx: &mut StateContext, message: &AgentMessage) -> Option<Transition> {
        match message {
            AgentMessage::Alert { player_position, .. } => {
                self.refocus(*player_position);
                Some(Transition::Stay)
            }
            AgentMessage::ShareSighting(sighting) => {
                self.refocus(sighting.position);
                Some(Transition::Stay)
            }
            AgentMessage::Damaged { source, .. } => {
                if let Some(source) = source {
                    ctx.remember_player(*source);
                }
                Some(Transition::Change(StateKind::Chase))
            }
            AgentMessage::Inspire { .. } => None,
        }
    }
}
