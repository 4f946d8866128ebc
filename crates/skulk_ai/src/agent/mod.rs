//! Agent: одна state machine + perception + боевые атрибуты + память
//!
//! Archetype (данные) выбирает набор states и параметры; тип агента один.

pub mod archetype;
pub mod body;
pub mod combat;
pub mod health;
pub mod memory;

pub use archetype::{Archetype, ArchetypeParams, ArchetypeTable, Role};
pub use body::{AgentBody, AgentId, StatModifiers};
pub use combat::{MeleePhase, MeleeTimer};
pub use health::Health;
pub use memory::{AgentMemory, AlertRecord, Sighting};

use std::sync::Arc;

use bevy::math::Vec2;

use crate::ai::{AgentCommand, AgentMessage, StateContext, StateKind, StateMachine, WorldSnapshot};
use crate::feedback::{FeedbackEvent, TintColor};
use crate::logger::{log_info, log_warning};

#[derive(Debug, Clone)]
pub struct Agent {
    pub body: AgentBody,
    brain: StateMachine,
}

impl Agent {
    pub fn new(id: AgentId, archetype: Arc<Archetype>, position: Vec2, seed: u64) -> Self {
        let brain = StateMachine::for_archetype(&archetype);
        Self {
            body: AgentBody::new(id, archetype, position, seed),
            brain,
        }
    }

    /// Переиспользование из пула: тело и state machine строятся заново
    /// из текущего archetype (таблица могла смениться с прошлого spawn)
    pub fn reset(&mut self, id: AgentId, archetype: Arc<Archetype>, position: Vec2, seed: u64) {
        self.brain = StateMachine::for_archetype(&archetype);
        self.body = AgentBody::new(id, archetype, position, seed);
    }

    pub fn id(&self) -> AgentId {
        self.body.id
    }

    pub fn archetype(&self) -> &Archetype {
        &self.body.archetype
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.body.position = position;
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn speed(&self) -> f32 {
        self.body.speed()
    }

    pub fn damage(&self) -> f32 {
        self.body.damage()
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    pub fn state(&self) -> Option<StateKind> {
        self.brain.current()
    }

    pub fn state_name(&self) -> Option<&'static str> {
        self.brain.current().map(|kind| kind.name())
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.brain
    }

    /// Вход в начальный state archetype
    pub fn start(&mut self, world: &WorldSnapshot, outbox: &mut Vec<AgentCommand>) -> bool {
        let initial = self.body.archetype.initial_state;
        self.change_state(initial, world, outbox)
    }

    pub fn update(&mut self, dt: f32, world: &WorldSnapshot, outbox: &mut Vec<AgentCommand>) {
        if !self.body.alive {
            return;
        }
        self.body.modifiers.tick(dt);

        let Agent { body, brain } = self;
        let mut ctx = StateContext::new(body, world, outbox, brain.registered(), brain.current());
        brain.update(&mut ctx, dt);
    }

    pub fn change_state(&mut self, kind: StateKind, world: &WorldSnapshot, outbox: &mut Vec<AgentCommand>) -> bool {
        let Agent { body, brain } = self;
        let mut ctx = StateContext::new(body, world, outbox, brain.registered(), brain.current());
        brain.change_state(&mut ctx, kind)
    }

    /// Переход по имени (динамические/моддинговые конфигурации).
    /// Неизвестное имя: warning и no-op.
    pub fn change_state_by_name(&mut self, name: &str, world: &WorldSnapshot, outbox: &mut Vec<AgentCommand>) -> bool {
        match StateKind::from_name(name) {
            Some(kind) => self.change_state(kind, world, outbox),
            None => {
                log_warning(&format!("⚠️ {}: unknown state '{}', ignoring", self.body.id, name));
                false
            }
        }
    }

    pub fn revert_to_previous_state(&mut self, world: &WorldSnapshot, outbox: &mut Vec<AgentCommand>) -> bool {
        let Agent { body, brain } = self;
        let mut ctx = StateContext::new(body, world, outbox, brain.registered(), brain.current());
        brain.revert_to_previous_state(&mut ctx)
    }

    /// Входящее сообщение: сначала эффекты на тело, потом state machine
    pub fn receive(&mut self, message: AgentMessage, world: &WorldSnapshot, outbox: &mut Vec<AgentCommand>) -> bool {
        if !self.body.alive {
            return false;
        }

        match &message {
            AgentMessage::Inspire { multiplier, duration } => {
                self.body.modifiers.apply_inspire(*multiplier, *duration);
                outbox.push(AgentCommand::Feedback(FeedbackEvent::Tint {
                    agent: self.body.id,
                    color: TintColor::Inspired,
                }));
            }
            AgentMessage::ShareSighting(sighting) => {
                // Устаревшая запись не стимул: state её не видит
                if !self.body.memory.merge_sighting(*sighting) {
                    return false;
                }
            }
            AgentMessage::Alert { origin, player_position } => {
                self.body.memory.log_alert(*origin, world.now);
                self.body.memory.merge_sighting(Sighting {
                    position: *player_position,
                    timestamp: world.now,
                });
            }
            AgentMessage::Damaged { .. } => {}
        }

        let Agent { body, brain } = self;
        let mut ctx = StateContext::new(body, world, outbox, brain.registered(), brain.current());
        brain.handle_message(&mut ctx, &message)
    }

    /// Урон агенту. Возвращает true если агент умер от этого удара.
    ///
    /// Archetype с Fear пугается от любого урона; остальные получают
    /// `Damaged` в текущий state.
    pub fn take_damage(
        &mut self,
        amount: f32,
        source: Option<Vec2>,
        world: &WorldSnapshot,
        outbox: &mut Vec<AgentCommand>,
    ) -> bool {
        if !self.body.alive {
            return false;
        }

        self.body.health.take_damage(amount);
        outbox.push(AgentCommand::Feedback(FeedbackEvent::Flash { agent: self.body.id }));

        if !self.body.health.is_alive() {
            self.body.alive = false;
            self.body.velocity = Vec2::ZERO;
            outbox.push(AgentCommand::Feedback(FeedbackEvent::Died {
                agent: self.body.id,
                position: self.body.position,
            }));
            log_info(&format!("💀 {} ({}) died", self.body.id, self.body.archetype.name));
            return true;
        }

        if self.brain.registered().contains(StateKind::Fear) && self.brain.current() != Some(StateKind::Fear) {
            self.change_state(StateKind::Fear, world, outbox);
        } else {
            self.receive(AgentMessage::Damaged { amount, source }, world, outbox);
        }
        false
    }

    /// Пометить на уничтожение (менеджер вернёт в пул на следующем update)
    pub fn request_destroy(&mut self) {
        self.body.destroy_requested = true;
    }

    pub fn should_despawn(&self) -> bool {
        !self.body.alive || self.body.destroy_requested
    }
}
