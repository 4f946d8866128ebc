//! Сообщения между агентами
//!
//! `AgentMessage`: входящее (обрабатывает state machine получателя).
//! `AgentCommand`: исходящее из state, доставляет `AgentManager` после того
//! как все агенты отработали тик. States никогда не трогают соседей напрямую.

use bevy::math::Vec2;

use crate::agent::{AgentId, Sighting};
use crate::feedback::FeedbackEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    /// Союзник заметил игрока
    Alert { origin: Vec2, player_position: Vec2 },
    /// Союзник делится более свежей позицией игрока
    ShareSighting(Sighting),
    /// Временный баф от berserk союзника
    Inspire { multiplier: f32, duration: f32 },
    Damaged { amount: f32, source: Option<Vec2> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentCommand {
    DamagePlayer {
        from: AgentId,
        damage: f32,
        knockback: Vec2,
    },
    /// Alert всем союзникам той же команды в радиусе от `origin`
    BroadcastAlert {
        from: AgentId,
        team: u32,
        origin: Vec2,
        radius: f32,
        player_position: Vec2,
    },
    /// Inspire всем агентам того же archetype в радиусе
    Inspire {
        from: AgentId,
        archetype: String,
        origin: Vec2,
        radius: f32,
        multiplier: f32,
        duration: f32,
    },
    ShareSighting {
        from: AgentId,
        to: AgentId,
        sighting: Sighting,
    },
    Feedback(FeedbackEvent),
}
