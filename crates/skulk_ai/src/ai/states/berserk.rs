//! Berserk: временная ярость + inspire союзникам того же archetype

use crate::agent::{MeleePhase, MeleeTimer};
use crate::ai::states::attack::strike;
use crate::ai::states::{AgentState, StateKind, Transition};
use crate::ai::{AgentCommand, StateContext};
use crate::feedback::{FeedbackEvent, TintColor};
use crate::logger::log_info;

#[derive(Debug, Clone, Default)]
pub struct BerserkState {
    elapsed: f32,
    melee: Option<MeleeTimer>,
}

impl BerserkState {
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl AgentState for BerserkState {
    fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        let params = ctx.body.archetype.params.clone();
        let id = ctx.body.id;

        ctx.body.berserk_spent = true;
        ctx.body.modifiers.rage = params.rage_multiplier;
        self.elapsed = 0.0;
        self.melee = Some(MeleeTimer::new(params.attack_cooldown, params.windup));

        log_info(&format!(
            "🔥 {} goes berserk (x{:.2} for {}ms)",
            id, params.rage_multiplier, params.berserk_duration
        ));
        ctx.feedback(FeedbackEvent::Tint {
            agent: id,
            color: TintColor::Rage,
        });
        ctx.feedback(FeedbackEvent::CameraShake {
            intensity: 0.02,
            duration_ms: 300.0,
        });

        if params.inspire_radius > 0.0 {
            let command = AgentCommand::Inspire {
                from: id,
                archetype: ctx.body.archetype.name.clone(),
                origin: ctx.body.position,
                radius: params.inspire_radius,
                multiplier: params.inspire_multiplier,
                duration: params.inspire_duration,
            };
            ctx.send(command);
        }
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, dt: f32) -> Transition {
        self.elapsed += dt;
        if self.elapsed >= ctx.body.archetype.params.berserk_duration {
            let next = if ctx.player_position().is_some() && ctx.has_state(StateKind::Chase) {
                StateKind::Chase
            } else {
                StateKind::Patrol
            };
            return Transition::Change(next);
        }

        let Some(player) = ctx.player_position() else {
            ctx.stop();
            return Transition::Stay;
        };
        ctx.remember_player(player);

        let attack_range = ctx.body.archetype.params.attack_range;
        let in_range = ctx.distance_to(player) <= attack_range;
        if in_range {
            ctx.stop();
            ctx.face(player);
        } else {
            let speed = ctx.body.speed();
            ctx.steer_towards(player, speed);
        }

        let Some(melee) = self.melee.as_mut() else {
            return Transition::Stay;
        };
        if in_range || melee.is_winding_up() {
            match melee.tick(dt) {
                MeleePhase::WindupStarted => {
                    let agent = ctx.body.id;
                    ctx.feedback(FeedbackEvent::AttackWindup { agent });
                }
                MeleePhase::Resolve => {
                    let damage = ctx.body.damage();
                    strike(ctx, damage);
                }
                MeleePhase::Idle => {}
            }
        }
        Transition::Stay
    }

    fn exit(&mut self, ctx: &mut StateContext) {
        ctx.body.modifiers.rage = 1.0;
        self.melee = None;
        let agent = ctx.body.id;
        ctx.feedback(FeedbackEvent::ClearTint { agent });
    }
}
