//! Слух: список sound events с volume-scaled cutoff и TTL.

use std::collections::VecDeque;

use bevy::math::Vec2;
use crate::geometry::distance;

/// Возраст (ms), после которого событие выбрасывается при чтении
pub const SOUND_TTL_MS: f64 = 3000.0;

/// Потолок хранимых событий: states без чтения слуха (Attack, Fear, ...)
/// не чистят список, самые старые вытесняются
pub const MAX_STORED_SOUNDS: usize = 32;

/// Категория шагов игрока: единственная, которая сразу триггерит Chase
pub const FOOTSTEP: &str = "footstep";

/// Услышанное событие
#[derive(Debug, Clone, PartialEq)]
pub struct SoundEvent {
    pub origin: Vec2,
    /// 0..1, работает как множитель дальности слышимости
    pub volume: f32,
    pub category: String,
    pub distance_from_listener: f32,
    pub timestamp: f64,
}

impl SoundEvent {
    pub fn is_footstep(&self) -> bool {
        self.category == FOOTSTEP
    }
}

/// Слух агента
///
/// Активного таймера expiry нет: старые события чистятся только при
/// `latest_sound`. Между чтениями список ограничен `MAX_STORED_SOUNDS`.
#[derive(Debug, Clone, Default)]
pub struct HearingSystem {
    pub hearing_range: f32,
    sound_events: VecDeque<SoundEvent>,
}

impl HearingSystem {
    pub fn new(hearing_range: f32) -> Self {
        Self {
            hearing_range,
            sound_events: VecDeque::new(),
        }
    }

    /// Предложить событие слушателю в точке `listener`.
    ///
    /// Принимается только при `distance ≤ hearing_range * volume`.
    /// Возвращает true если событие сохранено.
    pub fn add_sound_event(
        &mut self,
        listener: Vec2,
        origin: Vec2,
        volume: f32,
        category: impl Into<String>,
        now: f64,
    ) -> bool {
        let dist = distance(listener, origin);
        if dist > self.hearing_range * volume {
            return false;
        }

        if self.sound_events.len() == MAX_STORED_SOUNDS {
            self.sound_events.pop_front();
        }
        self.sound_events.push_back(SoundEvent {
            origin,
            volume,
            category: category.into(),
            distance_from_listener: dist,
            timestamp: now,
        });
        true
    }

    /// Самое свежее живое событие (max timestamp).
    ///
    /// Побочный эффект: события старше `SOUND_TTL_MS` удаляются.
    /// При равных timestamp побеждает первое в списке.
    pub fn latest_sound(&mut self, now: f64) -> Option<&SoundEvent> {
        self.sound_events
            .retain(|event| now - event.timestamp <= SOUND_TTL_MS);

        let mut latest: Option<&SoundEvent> = None;
        for event in &self.sound_events {
            match latest {
                Some(best) if event.timestamp <= best.timestamp => {}
                _ => latest = Some(event),
            }
        }
        latest
    }

    pub fn clear_sounds(&mut self) {
        self.sound_events.clear();
    }

    pub fn len(&self) -> usize {
        self.sound_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sound_events.is_empty()
    }
}
