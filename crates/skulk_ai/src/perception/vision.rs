//! Cone-of-vision проверка против точки.

use bevy::math::Vec2;
use crate::geometry::{angle_between, angle_difference, distance, line_of_sight};

/// Конус зрения агента
///
/// `view_angle`: полная ширина конуса (радианы), не половина.
/// Setters без валидации: угол не клампится в [0, 2π]. Значения > 2π
/// фактически превращают проверку в чистую проверку дистанции.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionSystem {
    pub view_distance: f32,
    pub view_angle: f32,
    pub facing_direction: f32,
}

impl Default for VisionSystem {
    fn default() -> Self {
        Self {
            view_distance: 200.0,
            view_angle: std::f32::consts::FRAC_PI_2,
            facing_direction: 0.0,
        }
    }
}

impl VisionSystem {
    pub fn new(view_distance: f32, view_angle: f32) -> Self {
        Self {
            view_distance,
            view_angle,
            facing_direction: 0.0,
        }
    }

    /// Видит ли владелец (в точке `owner`) цель `target`.
    ///
    /// true ⇔ distance ≤ view_distance И |bearing − facing| ≤ view_angle/2 И LOS.
    pub fn can_see(&self, owner: Vec2, target: Vec2) -> bool {
        if distance(owner, target) > self.view_distance {
            return false;
        }

        let bearing = angle_between(owner, target);
        if angle_difference(bearing, self.facing_direction) > self.view_angle / 2.0 {
            return false;
        }

        line_of_sight(owner, target)
    }

    pub fn set_view_distance(&mut self, distance: f32) {
        self.view_distance = distance;
    }

    pub fn set_view_angle(&mut self, angle: f32) {
        self.view_angle = angle;
    }

    pub fn set_direction(&mut self, direction: f32) {
        self.facing_direction = direction;
    }

    /// Повернуться лицом к точке (no-op если точка совпадает с владельцем)
    pub fn face_towards(&mut self, owner: Vec2, target: Vec2) {
        if owner != target {
            self.facing_direction = angle_between(owner, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_can_see_in_front() {
        let vision = VisionSystem::new(120.0, PI / 2.0);
        assert!(vision.can_see(Vec2::ZERO, Vec2::new(50.0, 0.0)));
    }

    #[test]
    fn test_cannot_see_beyond_distance_regardless_of_angle() {
        let vision = VisionSystem::new(120.0, TAU);
        assert!(!vision.can_see(Vec2::ZERO, Vec2::new(121.0, 0.0)));
        assert!(!vision.can_see(Vec2::ZERO, Vec2::new(-121.0, 0.0)));
    }

    #[test]
    fn test_full_circle_is_pure_distance_test() {
        let vision = VisionSystem::new(100.0, TAU);
        for deg in (0..360).step_by(15) {
            let rad = (deg as f32).to_radians();
            let target = Vec2::new(rad.cos(), rad.sin()) * 80.0;
            assert!(vision.can_see(Vec2::ZERO, target), "angle {} should pass", deg);
        }
    }

    #[test]
    fn test_cannot_see_behind() {
        let vision = VisionSystem::new(200.0, PI / 3.0);
        assert!(!vision.can_see(Vec2::ZERO, Vec2::new(-50.0, 0.0)));
        // Граница конуса: 30°: проходит, 40°: нет
        let edge = Vec2::new(29f32.to_radians().cos(), 29f32.to_radians().sin()) * 50.0;
        let outside = Vec2::new(40f32.to_radians().cos(), 40f32.to_radians().sin()) * 50.0;
        assert!(vision.can_see(Vec2::ZERO, edge));
        assert!(!vision.can_see(Vec2::ZERO, outside));
    }

    #[test]
    fn test_facing_wraps_around_pi() {
        let mut vision = VisionSystem::new(200.0, PI / 2.0);
        vision.set_direction(PI - 0.1);
        // Цель почти строго слева (bearing ≈ -π + 0.1)
        let target = Vec2::new(-100.0, -10.0);
        assert!(vision.can_see(Vec2::ZERO, target));
    }

    #[test]
    fn test_unclamped_angle_is_accepted_as_is() {
        let mut vision = VisionSystem::default();
        vision.set_view_angle(10.0 * PI);
        assert_eq!(vision.view_angle, 10.0 * PI);
        assert!(vision.can_see(Vec2::ZERO, Vec2::new(-10.0, 0.0)));
    }
}
