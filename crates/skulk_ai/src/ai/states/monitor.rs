//! Global state: координация и stat-триггеры каждый тик

use crate::agent::Role;
use crate::ai::coordination::{refresh_pack_bonus, share_team_memory};
use crate::ai::states::{AgentState, StateKind, Transition};
use crate::ai::StateContext;

#[derive(Debug, Clone, Default)]
pub struct MonitorState;

impl MonitorState {
    fn berserk_trigger(ctx: &StateContext) -> bool {
        ctx.has_state(StateKind::Berserk)
            && !ctx.body.berserk_spent
            && ctx.current_state() != Some(StateKind::Berserk)
            && ctx.body.health.fraction() <= ctx.body.archetype.params.berserk_threshold
    }

    fn fear_trigger(ctx: &StateContext) -> bool {
        if !ctx.has_state(StateKind::Fear) || ctx.current_state() == Some(StateKind::Fear) {
            return false;
        }
        ctx.player_position()
            .is_some_and(|player| ctx.distance_to(player) < ctx.body.archetype.params.fear_distance)
    }
}

impl AgentState for MonitorState {
    fn update(&mut self, ctx: &mut StateContext, _dt: f32) -> Transition {
        match ctx.body.archetype.params.role {
            Role::Pack => {
                refresh_pack_bonus(ctx.world, ctx.body);
            }
            Role::Team => {
                let commands = share_team_memory(ctx.world, ctx.body);
                ctx.outbox.extend(commands);
            }
            Role::Solo => {}
        }

        if Self::berserk_trigger(ctx) {
            return Transition::Change(StateKind::Berserk);
        }
        if Self::fear_trigger(ctx) {
            return Transition::Change(StateKind::Fear);
        }
        Transition::Stay
    }
}
