//! Attack: cooldown → windup → удар с повторной проверкой дистанции

use crate::agent::{MeleePhase, MeleeTimer};
use crate::ai::states::{AgentState, StateKind, Transition};
use crate::ai::{AgentCommand, StateContext};
use crate::feedback::FeedbackEvent;
use crate::geometry::{distance, velocity_towards};

/// Во сколько раз дальше attack_range игрок должен уйти, чтобы вернуться в Chase
const DISENGAGE_FACTOR: f32 = 1.5;

#[derive(Debug, Clone, Default)]
pub struct AttackState {
    timer: Option<MeleeTimer>,
}

impl AttackState {
    pub fn timer(&self) -> Option<&MeleeTimer> {
        self.timer.as_ref()
    }
}

impl AgentState for AttackState {
    fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        let params = &ctx.body.archetype.params;
        self.timer = Some(MeleeTimer::new(params.attack_cooldown, params.windup));
        ctx.stop();
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, dt: f32) -> Transition {
        let Some(player) = ctx.player_position() else {
            return Transition::Change(StateKind::Patrol);
        };

        let attack_range = ctx.body.archetype.params.attack_range;
        if ctx.distance_to(player) > attack_range * DISENGAGE_FACTOR {
            return Transition::Change(StateKind::Chase);
        }

        ctx.face(player);
        ctx.stop();
        ctx.remember_player(player);

        let Some(timer) = self.timer.as_mut() else {
            return Transition::Stay;
        };
        match timer.tick(dt) {
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
        Transition::Stay
    }

    fn exit(&mut self, _ctx: &mut StateContext) {
        self.timer = None;
    }
}

/// Момент удара: урон + knockback, только если игрок всё ещё в attack_range.
/// Вне дистанции удар уходит в пустоту.
pub(crate) fn strike(ctx: &mut StateContext, damage: f32) -> bool {
    let Some(player) = ctx.player_position() else {
        return false;
    };
    let params = &ctx.body.archetype.params;
    if distance(ctx.body.position, player) > params.attack_range {
        return false;
    }

    let knockback = velocity_towards(ctx.body.position, player, params.knockback);
    let from = ctx.body.id;
    ctx.send(AgentCommand::DamagePlayer {
        from,
        damage,
        knockback,
    });
    ctx.feedback(FeedbackEvent::PlayerHit { agent: from, damage });
    ctx.feedback(FeedbackEvent::CameraShake {
        intensity: 0.01,
        duration_ms: 100.0,
    });
    true
}
