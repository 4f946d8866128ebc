//! Тело агента: всё, кроме state machine
//!
//! States получают `&mut AgentBody` через `StateContext`; state machine
//! живёт рядом в `Agent`, поэтому borrow не пересекаются.

use std::fmt;
use std::sync::Arc;

use bevy::math::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::agent::{AgentMemory, Archetype, Health};
use crate::perception::{HearingSystem, VisionSystem};

/// Стабильный id агента. Монотонно растёт, порядок id = порядок спавна.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Множители к base stats.
///
/// Эффективное значение всегда считается от base константы archetype,
/// поэтому множители не накапливаются между тиками.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatModifiers {
    /// Pack bonus (пересчитывается каждый тик)
    pub pack: f32,
    /// Berserk rage (1.0 вне berserk)
    pub rage: f32,
    /// Inspire от союзника
    pub inspire: f32,
    pub inspire_remaining: f32,
}

impl Default for StatModifiers {
    fn default() -> Self {
        Self {
            pack: 1.0,
            rage: 1.0,
            inspire: 1.0,
            inspire_remaining: 0.0,
        }
    }
}

impl StatModifiers {
    pub fn multiplier(&self) -> f32 {
        self.pack * self.rage * self.inspire
    }

    pub fn apply_inspire(&mut self, multiplier: f32, duration: f32) {
        self.inspire = multiplier;
        self.inspire_remaining = duration;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.inspire_remaining > 0.0 {
            self.inspire_remaining -= dt;
            if self.inspire_remaining <= 0.0 {
                self.inspire_remaining = 0.0;
                self.inspire = 1.0;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentBody {
    pub id: AgentId,
    pub archetype: Arc<Archetype>,
    pub position: Vec2,
    /// Желаемая скорость (units/sec); физику применяет хост
    pub velocity: Vec2,
    /// Точка спавна, центр патрульного маршрута
    pub home: Vec2,
    pub health: Health,
    pub modifiers: StatModifiers,
    pub vision: VisionSystem,
    pub hearing: HearingSystem,
    pub memory: AgentMemory,
    pub rng: ChaCha8Rng,
    pub alive: bool,
    pub destroy_requested: bool,
    pub berserk_spent: bool,
    pub disguised: bool,
    /// Reveal необратим на всю жизнь агента
    pub revealed: bool,
}

impl AgentBody {
    pub fn new(id: AgentId, archetype: Arc<Archetype>, position: Vec2, seed: u64) -> Self {
        let params = &archetype.params;
        let vision = VisionSystem::new(params.view_distance, params.view_angle);
        let hearing = HearingSystem::new(params.hearing_range);
        let health = Health::new(params.max_health);

        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            home: position,
            health,
            modifiers: StatModifiers::default(),
            vision,
            hearing,
            memory: AgentMemory::default(),
            rng: ChaCha8Rng::seed_from_u64(agent_seed(seed, id)),
            alive: true,
            destroy_requested: false,
            berserk_spent: false,
            disguised: false,
            revealed: false,
            archetype,
        }
    }

    pub fn team(&self) -> u32 {
        self.archetype.params.team
    }

    /// Эффективная скорость (base × множители)
    pub fn speed(&self) -> f32 {
        self.archetype.params.speed * self.modifiers.multiplier()
    }

    /// Эффективный урон удара (base contact damage × множители)
    pub fn damage(&self) -> f32 {
        self.archetype.params.contact_damage * self.modifiers.multiplier()
    }
}

/// Seed RNG агента: общий seed менеджера, перемешанный с id
fn agent_seed(seed: u64, id: AgentId) -> u64 {
    seed ^ id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
