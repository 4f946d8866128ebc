//! Chase: преследование игрока по зрению, затем по последней известной позиции

use crate::agent::Sighting;
use crate::ai::coordination::should_surround;
use crate::ai::states::{
    heard_footstep, AgentState, StateKind, Transition, ARRIVE_DISTANCE, ATTACK_ENGAGE_DISTANCE,
};
use crate::ai::{AgentMessage, StateContext};

#[derive(Debug, Clone, Default)]
pub struct ChaseState {
    /// Время без стимула (ms); сбрасывается при виде игрока или свежем звуке
    time_since_seen: f32,
}

impl ChaseState {
    pub fn time_since_seen(&self) -> f32 {
        self.time_since_seen
    }
}

impl AgentState for ChaseState {
    fn enter(&mut self, _ctx: &mut StateContext) -> Transition {
        self.time_since_seen = 0.0;
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, dt: f32) -> Transition {
        // Игрока нет в сцене (reset / смерть): некого преследовать
        if ctx.player_position().is_none() {
            return Transition::Change(StateKind::Patrol);
        }

        if let Some(player) = ctx.visible_player() {
            ctx.remember_player(player);
            self.time_since_seen = 0.0;

            if ctx.distance_to(player) < ATTACK_ENGAGE_DISTANCE && ctx.has_state(StateKind::Attack) {
                ctx.stop();
                return Transition::Change(StateKind::Attack);
            }
            if ctx.has_state(StateKind::Surround) && should_surround(ctx.world, ctx.body, player) {
                return Transition::Change(StateKind::Surround);
            }

            let speed = ctx.body.speed();
            ctx.steer_towards(player, speed);
            return Transition::Stay;
        }

        // Порог проверяется до накопления: сумма dt == lose_target_time
        // переводит в Patrol на следующем тике
        let lose_target_time = ctx.body.archetype.params.lose_target_time;
        if self.time_since_seen >= lose_target_time {
            ctx.body.memory.forget_player();
            ctx.stop();
            return Transition::Change(StateKind::Patrol);
        }
        self.time_since_seen += dt;

        if heard_footstep(ctx) == Some(true) {
            self.time_since_seen = 0.0;
        }

        match ctx.body.memory.last_player {
            Some(last) if ctx.distance_to(last.position) <= ARRIVE_DISTANCE => {
                ctx.body.memory.forget_player();
                ctx.stop();
            }
            Some(last) => {
                let speed = ctx.body.speed();
                ctx.steer_towards(last.position, speed);
            }
            None => ctx.stop(),
        }
        Transition::Stay
    }

    fn handle_message(&mut self, ctx: &mut StateContext, message: &AgentMessage) -> Option<Transition> {
        match message {
            AgentMessage::Alert { .. } | AgentMessage::ShareSighting(_) => {
                // Тело пропускает сюда только принятые (строго более новые) записи
                self.time_since_seen = 0.0;
                Some(Transition::Stay)
            }
            AgentMessage::Damaged { source: Some(source), .. } => {
                let now = ctx.now();
                ctx.body.memory.remember_player(Sighting {
                    position: *source,
                    timestamp: now,
                });
                self.time_since_seen = 0.0;
                Some(Transition::Stay)
            }
            _ => None,
        }
    }
}
