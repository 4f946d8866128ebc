//! Surround: кольцо вокруг игрока, слот по рангу среди участников

use bevy::math::Vec2;

use crate::ai::coordination::surround_slot;
use crate::ai::states::{AgentState, StateKind, Transition};
use crate::ai::StateContext;

/// Дистанция до слота, с которой начинается атака
const SLOT_REACHED_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, Default)]
pub struct SurroundState {
    slot: Option<Vec2>,
}

impl SurroundState {
    pub fn slot(&self) -> Option<Vec2> {
        self.slot
    }
}

impl AgentState for SurroundState {
    fn update(&mut self, ctx: &mut StateContext, _dt: f32) -> Transition {
        let Some(player) = ctx.player_position() else {
            return Transition::Change(StateKind::Patrol);
        };

        let view_distance = ctx.body.archetype.params.view_distance;
        if ctx.distance_to(player) > view_distance * 1.5 {
            return Transition::Change(StateKind::Chase);
        }
        ctx.remember_player(player);

        let slot = surround_slot(ctx.world, ctx.body, player);
        self.slot = Some(slot);

        if ctx.distance_to(slot) <= SLOT_REACHED_DISTANCE {
            ctx.stop();
            ctx.face(player);
            return Transition::Change(StateKind::Attack);
        }

        let speed = ctx.body.speed();
        ctx.steer_towards(slot, speed);
        Transition::Stay
    }

    fn exit(&mut self, _ctx: &mut StateContext) {
        self.slot = None;
    }
}
