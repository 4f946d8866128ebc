//! Disguise → Reveal: маскировка до первого сближения или урона.
//! Reveal необратим до конца жизни агента.

use crate::ai::states::{AgentState, StateKind, Transition};
use crate::ai::{AgentCommand, AgentMessage, StateContext};
use crate::feedback::{FeedbackEvent, TintColor};

#[derive(Debug, Clone, Default)]
pub struct DisguiseState;

impl AgentState for DisguiseState {
    fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        // Раскрытый агент обратно не маскируется
        if ctx.body.revealed {
            return Transition::Change(StateKind::Chase);
        }
        ctx.body.disguised = true;
        ctx.stop();
        let agent = ctx.body.id;
        ctx.feedback(FeedbackEvent::Tint {
            agent,
            color: TintColor::Camouflage,
        });
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, _dt: f32) -> Transition {
        ctx.stop();
        let Some(player) = ctx.player_position() else {
            return Transition::Stay;
        };
        if ctx.distance_to(player) <= ctx.body.archetype.params.trigger_distance {
            return Transition::Change(StateKind::Reveal);
        }
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut StateContext) {
        ctx.body.disguised = false;
        let agent = ctx.body.id;
        ctx.feedback(FeedbackEvent::ClearTint { agent });
    }

    fn handle_message(&mut self, ctx: &mut StateContext, message: &AgentMessage) -> Option<Transition> {
        match message {
            AgentMessage::Damaged { source, .. } => {
                if let Some(source) = source {
                    ctx.remember_player(*source);
                }
                Some(Transition::Change(StateKind::Reveal))
            }
            // Замаскированный агент не реагирует на тревоги союзников
            _ => Some(Transition::Stay),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RevealState;

impl AgentState for RevealState {
    fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        ctx.body.revealed = true;
        ctx.body.disguised = false;

        let params = &ctx.body.archetype.params;
        let (radius, damage, knockback) = (params.burst_radius, params.contact_damage, params.knockback);
        let agent = ctx.body.id;
        let position = ctx.body.position;

        ctx.feedback(FeedbackEvent::RevealBurst {
            agent,
            position,
            radius,
        });
        ctx.feedback(FeedbackEvent::Particles {
            position,
            kind: "reveal_burst",
        });
        ctx.feedback(FeedbackEvent::CameraShake {
            intensity: 0.015,
            duration_ms: 200.0,
        });

        if let Some(player) = ctx.player_position() {
            if ctx.distance_to(player) <= radius {
                ctx.remember_player(player);
                ctx.send(AgentCommand::DamagePlayer {
                    from: agent,
                    damage,
                    knockback: (player - position).normalize_or_zero() * knockback,
                });
            }
        }
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, _dt: f32) -> Transition {
        if ctx.has_state(StateKind::Chase) {
            Transition::Change(StateKind::Chase)
        } else {
            Transition::Change(StateKind::Patrol)
        }
    }
}
