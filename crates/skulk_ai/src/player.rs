//! Игрок глазами AI: позиция, жив ли, приём ударов
//!
//! Scene/world collaborator. AI только читает позицию и отправляет удары.

use bevy::prelude::*;
use crate::agent::Health;

pub trait PlayerTarget {
    fn position(&self) -> Vec2;

    fn is_alive(&self) -> bool;

    /// Урон + knockback импульс (направлен от агента к игроку)
    fn apply_hit(&mut self, damage: f32, knockback: Vec2);
}

/// Stand-in игрока для headless симуляции и тестов
#[derive(Resource, Debug, Clone)]
pub struct SimPlayer {
    pub position: Vec2,
    pub health: Health,
    /// Накопленный knockback (хост применяет и сбрасывает)
    pub knockback: Vec2,
    pub hits_taken: u32,
}

impl SimPlayer {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            health: Health::new(100.0),
            knockback: Vec2::ZERO,
            hits_taken: 0,
        }
    }

    pub fn with_health(mut self, max: f32) -> Self {
        self.health = Health::new(max);
        self
    }
}

impl PlayerTarget for SimPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    fn apply_hit(&mut self, damage: f32, knockback: Vec2) {
        self.health.take_damage(damage);
        self.knockback += knockback;
        self.hits_taken += 1;
    }
}
