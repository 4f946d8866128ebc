//! Perception: зрение (cone of vision) и слух (sound events с TTL)
//!
//! Обе подсистемы принадлежат одному агенту и не шарятся.
//! Позиция владельца передаётся в каждый запрос: perception не хранит transform.

pub mod hearing;
pub mod vision;

pub use hearing::{HearingSystem, SoundEvent, MAX_STORED_SOUNDS, SOUND_TTL_MS};
pub use vision::VisionSystem;
