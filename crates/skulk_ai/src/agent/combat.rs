//! Melee timer: cooldown → windup → resolution
//!
//! Cooldown накапливается пока агент в атакующем state. Когда накопленное
//! время достигает cooldown, начинается windup; по окончании windup хозяин
//! проверяет дистанцию заново и решает, наносить ли урон. Cooldown
//! сбрасывается в любом случае.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeleePhase {
    /// Ничего не произошло на этом тике
    Idle,
    /// Cooldown истёк, начался windup
    WindupStarted,
    /// Windup закончился: момент удара
    Resolve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeleeTimer {
    /// Cooldown между ударами (ms)
    pub cooldown: f32,
    /// Длительность замаха (ms)
    pub windup: f32,
    elapsed: f32,
    windup_remaining: Option<f32>,
}

impl MeleeTimer {
    pub fn new(cooldown: f32, windup: f32) -> Self {
        Self {
            cooldown,
            windup,
            elapsed: 0.0,
            windup_remaining: None,
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.windup_remaining = None;
    }

    pub fn is_winding_up(&self) -> bool {
        self.windup_remaining.is_some()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tick(&mut self, dt: f32) -> MeleePhase {
        if let Some(remaining) = self.windup_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.reset();
                return MeleePhase::Resolve;
            }
            return MeleePhase::Idle;
        }

        self.elapsed += dt;
        if self.elapsed >= self.cooldown {
            self.windup_remaining = Some(self.windup);
            return MeleePhase::WindupStarted;
        }
        MeleePhase::Idle
    }
}
