//! StateContext: всё, что state видит на тике

use bevy::math::Vec2;

use crate::agent::{AgentBody, Sighting};
use crate::ai::{AgentCommand, StateKind, StateSet, WorldSnapshot};
use crate::feedback::FeedbackEvent;
use crate::geometry::{angle_between, distance, velocity_towards};

/// Контекст вызова state: тело агента (mut), снимок мира (read-only),
/// outbox для команд соседям/игроку.
pub struct StateContext<'a> {
    pub body: &'a mut AgentBody,
    pub world: &'a WorldSnapshot,
    pub outbox: &'a mut Vec<AgentCommand>,
    registered: StateSet,
    pub(crate) current: Option<StateKind>,
}

impl<'a> StateContext<'a> {
    pub fn new(
        body: &'a mut AgentBody,
        world: &'a WorldSnapshot,
        outbox: &'a mut Vec<AgentCommand>,
        registered: StateSet,
        current: Option<StateKind>,
    ) -> Self {
        Self {
            body,
            world,
            outbox,
            registered,
            current,
        }
    }

    pub fn now(&self) -> f64 {
        self.world.now
    }

    pub fn current_state(&self) -> Option<StateKind> {
        self.current
    }

    pub fn has_state(&self, kind: StateKind) -> bool {
        self.registered.contains(kind)
    }

    /// Позиция живого игрока (None если игрока нет или он мёртв)
    pub fn player_position(&self) -> Option<Vec2> {
        self.world.player_position()
    }

    /// Позиция игрока, если агент его видит
    pub fn visible_player(&self) -> Option<Vec2> {
        let player = self.player_position()?;
        self.body
            .vision
            .can_see(self.body.position, player)
            .then_some(player)
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        distance(self.body.position, point)
    }

    pub fn remember_player(&mut self, position: Vec2) {
        let sighting = Sighting {
            position,
            timestamp: self.world.now,
        };
        self.body.memory.remember_player(sighting);
    }

    /// Желаемая скорость к цели + поворот vision в сторону движения
    pub fn steer_towards(&mut self, target: Vec2, speed: f32) {
        let body = &mut *self.body;
        if body.position == target {
            body.velocity = Vec2::ZERO;
            return;
        }
        body.velocity = velocity_towards(body.position, target, speed);
        body.vision.set_direction(angle_between(body.position, target));
    }

    pub fn face(&mut self, target: Vec2) {
        let position = self.body.position;
        self.body.vision.face_towards(position, target);
    }

    pub fn stop(&mut self) {
        self.body.velocity = Vec2::ZERO;
    }

    pub fn send(&mut self, command: AgentCommand) {
        self.outbox.push(command);
    }

    pub fn feedback(&mut self, event: FeedbackEvent) {
        self.outbox.push(AgentCommand::Feedback(event));
    }
}
