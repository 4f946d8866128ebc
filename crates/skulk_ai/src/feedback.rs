//! Visual/audio feedback hooks
//!
//! Fire-and-forget: AI пишет события, хост (рендер, звук, камера) читает.
//! Корректность симуляции от них не зависит.

use bevy::math::Vec2;
use crate::agent::AgentId;

/// Цвет tint для спрайта агента
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TintColor {
    Rage,
    Fear,
    Inspired,
    Camouflage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
    Spawned { agent: AgentId, archetype: String, position: Vec2 },
    Died { agent: AgentId, position: Vec2 },
    Tint { agent: AgentId, color: TintColor },
    ClearTint { agent: AgentId },
    /// Белая вспышка при получении урона
    Flash { agent: AgentId },
    AttackWindup { agent: AgentId },
    PlayerHit { agent: AgentId, damage: f32 },
    CameraShake { intensity: f32, duration_ms: f32 },
    Particles { position: Vec2, kind: &'static str },
    RevealBurst { agent: AgentId, position: Vec2, radius: f32 },
}

impl FeedbackEvent {
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            FeedbackEvent::Spawned { agent, .. }
            | FeedbackEvent::Died { agent, .. }
            | FeedbackEvent::Tint { agent, .. }
            | FeedbackEvent::ClearTint { agent }
            | FeedbackEvent::Flash { agent }
            | FeedbackEvent::AttackWindup { agent }
            | FeedbackEvent::PlayerHit { agent, .. }
            | FeedbackEvent::RevealBurst { agent, .. } => Some(*agent),
            FeedbackEvent::CameraShake { .. } | FeedbackEvent::Particles { .. } => None,
        }
    }
}
