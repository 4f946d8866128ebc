//! Геометрия для perception (2D, `Vec2`)
//!
//! Чистые функции: distance, bearing, нормализация углов.

use bevy::math::Vec2;
use std::f32::consts::{PI, TAU};

/// Евклидово расстояние между двумя точками
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Bearing от `from` к `to` (радианы, atan2(dy, dx))
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Абсолютная угловая разница, нормализованная в [0, π]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

/// Единичный вектор по углу
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Желаемая скорость к цели (speed units/sec); ноль если уже на месте
pub fn velocity_towards(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Line-of-sight между точками.
///
/// Препятствий в симуляции нет (pathfinding вне scope), всегда true.
#[inline]
pub fn line_of_sight(_from: Vec2, _to: Vec2) -> bool {
    true
}
