//! Camera yaw and camera-relative input
//!
//! Input directions are given relative to the view. The board works in grid
//! directions, so every move request is rotated by the yaw sector first.

use serde::{Deserialize, Serialize};

use super::cube::Direction;

/// Clockwise ring used for the sector rotation
const RING: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

/// Normalize degrees to [0, 360)
#[inline]
pub fn normalize_yaw(deg: f32) -> f32 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current yaw in degrees, [0, 360)
    yaw: f32,
    /// Yaw being animated toward, if any
    target_yaw: Option<f32>,
    /// Degrees per tick while animating
    turn_speed: f32,
}

impl Camera {
    pub fn new(yaw: f32, turn_speed: f32) -> Self {
        Self {
            yaw: normalize_yaw(yaw),
            target_yaw: None,
            turn_speed: turn_speed.abs().max(f32::EPSILON),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Jump straight to `yaw`, cancelling any turn in progress
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = normalize_yaw(yaw);
        self.target_yaw = None;
    }

    pub fn is_animating(&self) -> bool {
        self.target_yaw.is_some()
    }

    /// Quarter turn, counter-clockwise seen from above
    pub fn rotate_left(&mut self) {
        self.target_yaw = Some(normalize_yaw(self.yaw + 90.0));
    }

    /// Quarter turn, clockwise seen from above
    pub fn rotate_right(&mut self) {
        self.target_yaw = Some(normalize_yaw(self.yaw - 90.0));
    }

    /// Step the yaw toward its target along the shorter arc
    pub fn animate(&mut self) {
        let Some(target) = self.target_yaw else {
            return;
        };

        let mut diff = target - self.yaw;
        if diff > 180.0 {
            diff -= 360.0;
        } else if diff < -180.0 {
            diff += 360.0;
        }

        if diff.abs() < self.turn_speed {
            self.yaw = target;
            self.target_yaw = None;
            return;
        }
        self.yaw = normalize_yaw(self.yaw + diff.signum() * self.turn_speed);
    }

    /// Which quarter of the circle the camera faces, 0..4
    pub fn sector(&self) -> usize {
        ((self.yaw + 45.0) / 90.0).floor() as usize % 4
    }

    /// Map a view-relative direction to a grid direction
    pub fn transform(&self, direction: Direction) -> Direction {
        let Some(index) = RING.iter().position(|&d| d == direction) else {
            return direction;
        };
        RING[(index + self.sector()) % 4]
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.0, crate::consts::CAMERA_TURN_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(yaw: f32) -> Camera {
        Camera::new(yaw, 5.0)
    }

    #[test]
    fn test_sector_boundaries() {
        assert_eq!(camera_at(0.0).sector(), 0);
        assert_eq!(camera_at(44.9).sector(), 0);
        assert_eq!(camera_at(45.0).sector(), 1);
        assert_eq!(camera_at(100.0).sector(), 1);
        assert_eq!(camera_at(180.0).sector(), 2);
        assert_eq!(camera_at(225.0).sector(), 3);
        assert_eq!(camera_at(314.9).sector(), 3);
        assert_eq!(camera_at(315.0).sector(), 0);
        assert_eq!(camera_at(-90.0).sector(), 3);
    }

    #[test]
    fn test_transform_identity_at_zero() {
        let camera = camera_at(0.0);
        for d in Direction::ALL {
            assert_eq!(camera.transform(d), d);
        }
    }

    #[test]
    fn test_transform_sector_one_turns_clockwise() {
        let camera = camera_at(100.0);
        assert_eq!(camera.transform(Direction::Up), Direction::Right);
        assert_eq!(camera.transform(Direction::Right), Direction::Down);
        assert_eq!(camera.transform(Direction::Down), Direction::Left);
        assert_eq!(camera.transform(Direction::Left), Direction::Up);
    }

    #[test]
    fn test_transform_sectors_two_and_three() {
        let half = camera_at(180.0);
        for d in Direction::ALL {
            assert_eq!(half.transform(d), d.opposite());
        }
        let three = camera_at(270.0);
        assert_eq!(three.transform(Direction::Up), Direction::Left);
        assert_eq!(three.transform(Direction::Left), Direction::Down);
    }

    #[test]
    fn test_quarter_turn_animation() {
        let mut camera = camera_at(0.0);
        camera.rotate_left();
        assert!(camera.is_animating());
        let mut ticks = 0;
        while camera.is_animating() && ticks < 100 {
            camera.animate();
            ticks += 1;
        }
        assert_eq!(camera.yaw(), 90.0);
        // 18 full steps, then one tick to clear the target
        assert_eq!(ticks, 19);
    }

    #[test]
    fn test_rotate_right_wraps_through_zero() {
        let mut camera = camera_at(45.0);
        camera.rotate_right();
        for _ in 0..100 {
            camera.animate();
        }
        assert_eq!(camera.yaw(), 315.0);
        assert!(!camera.is_animating());
    }

    #[test]
    fn test_set_yaw_cancels_turn() {
        let mut camera = camera_at(0.0);
        camera.rotate_left();
        camera.set_yaw(370.0);
        assert!(!camera.is_animating());
        assert_eq!(camera.yaw(), 10.0);
    }
}
