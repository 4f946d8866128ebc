//! Fear: бегство от игрока с jitter, затухает со временем

use std::f32::consts::PI;

use rand::Rng;

use crate::ai::states::{AgentState, StateKind, Transition};
use crate::ai::{AgentMessage, StateContext};
use crate::feedback::{FeedbackEvent, TintColor};
use crate::geometry::{angle_between, direction};

/// Период пересчёта направления бегства (ms)
const REEVALUATE_INTERVAL: f32 = 500.0;
const MAX_JITTER: f32 = PI / 6.0;
const FLEE_SPEED_FACTOR: f32 = 1.2;

#[derive(Debug, Clone, Default)]
pub struct FearState {
    elapsed: f32,
    reevaluate: f32,
    bearing: f32,
}

impl FearState {
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn bearing(&self) -> f32 {
        self.bearing
    }
}

impl AgentState for FearState {
    fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        self.elapsed = 0.0;
        self.reevaluate = 0.0;
        self.bearing = ctx.body.vision.facing_direction + PI;
        let agent = ctx.body.id;
        ctx.feedback(FeedbackEvent::Tint {
            agent,
            color: TintColor::Fear,
        });
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, dt: f32) -> Transition {
        let params = &ctx.body.archetype.params;
        let (fear_distance, fear_duration) = (params.fear_distance, params.fear_duration);

        self.elapsed += dt;
        let player = ctx.player_position();
        // Игрок рядом: страх не проходит
        if let Some(player) = player {
            if ctx.distance_to(player) < fear_distance {
                self.elapsed = self.elapsed.min(fear_duration / 2.0);
            }
        }
        if self.elapsed >= fear_duration {
            ctx.stop();
            return Transition::Change(StateKind::Patrol);
        }

        self.reevaluate -= dt;
        if self.reevaluate <= 0.0 {
            if let Some(player) = player {
                let away = angle_between(player, ctx.body.position);
                let jitter = ctx.body.rng.gen_range(-MAX_JITTER..=MAX_JITTER);
                self.bearing = away + jitter;
            }
            self.reevaluate = REEVALUATE_INTERVAL;
        }

        let speed = ctx.body.speed() * FLEE_SPEED_FACTOR;
        ctx.body.velocity = direction(self.bearing) * speed;
        ctx.body.vision.set_direction(self.bearing);
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut StateContext) {
        let agent = ctx.body.id;
        ctx.feedback(FeedbackEvent::ClearTint { agent });
    }

    fn handle_message(&mut self, _ctx: &mut StateContext, message: &AgentMessage) -> Option<Transition> {
        match message {
            AgentMessage::Damaged { .. } => {
                self.elapsed = 0.0;
                Some(Transition::Stay)
            }
            _ => None,
        }
    }
}
