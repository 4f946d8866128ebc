//! Рабочая память агента: последняя позиция игрока, история, журнал тревог

use std::collections::VecDeque;
use bevy::math::Vec2;

const HISTORY_LIMIT: usize = 16;

/// Наблюдение игрока (прямое, по звуку или от союзника)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub position: Vec2,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertRecord {
    pub origin: Vec2,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AgentMemory {
    pub last_player: Option<Sighting>,
    /// Точка, которую Alert должен обыскать при входе
    pub investigate: Option<Vec2>,
    /// Timestamp последней сброшенной записи: её повторный приход не новость
    forgotten: Option<f64>,
    sightings: VecDeque<Sighting>,
    alerts: VecDeque<AlertRecord>,
}

impl AgentMemory {
    pub fn remember_player(&mut self, sighting: Sighting) {
        self.last_player = Some(sighting);
        push_bounded(&mut self.sightings, sighting);
    }

    /// Принять наблюдение только если оно строго новее текущего
    pub fn merge_sighting(&mut self, sighting: Sighting) -> bool {
        if self.is_newer(&sighting) {
            self.remember_player(sighting);
            true
        } else {
            false
        }
    }

    pub fn is_newer(&self, sighting: &Sighting) -> bool {
        self.known_until().map_or(true, |known| sighting.timestamp > known)
    }

    /// Самый свежий timestamp, который агент видел (включая сброшенный)
    pub fn known_until(&self) -> Option<f64> {
        match (self.last_player, self.forgotten) {
            (Some(current), Some(forgotten)) => Some(current.timestamp.max(forgotten)),
            (Some(current), None) => Some(current.timestamp),
            (None, forgotten) => forgotten,
        }
    }

    /// Цель отработана (дошли / таймаут). Timestamp остаётся как watermark.
    pub fn forget_player(&mut self) {
        self.forgotten = self.known_until();
        self.last_player = None;
    }

    pub fn log_alert(&mut self, origin: Vec2, timestamp: f64) {
        push_bounded(&mut self.alerts, AlertRecord { origin, timestamp });
    }

    pub fn sightings(&self) -> impl Iterator<Item = &Sighting> {
        self.sightings.iter()
    }

    pub fn alerts(&self) -> impl Iterator<Item = &AlertRecord> {
        self.alerts.iter()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T) {
    if queue.len() == HISTORY_LIMIT {
        queue.pop_front();
    }
    queue.push_back(item);
}
