/// Continuous arena geometry shared by every module
///
/// World positions are arena pixels (f32). Directions are unit vectors or
/// `Vec2::ZERO` when there is nowhere to go.

use serde::{Deserialize, Serialize};

/// 2D position (world coordinates, arena pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub const ORIGIN: WorldPosition = WorldPosition { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &WorldPosition) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn distance_squared_to(&self, other: &WorldPosition) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Vector from `self` to `other`
    #[inline]
    pub fn delta_to(&self, other: &WorldPosition) -> Vec2 {
        Vec2::new(other.x - self.x, other.y - self.y)
    }

    /// Unit direction toward `other` (zero when both coincide)
    #[inline]
    pub fn direction_to(&self, other: &WorldPosition) -> Vec2 {
        self.delta_to(other).normalize()
    }

    #[inline]
    pub fn offset(&self, v: Vec2) -> WorldPosition {
        WorldPosition::new(self.x + v.x, self.y + v.y)
    }
}

impl From<(f32, f32)> for WorldPosition {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// 2D vector for directions and displacements
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Normalize vector (length 1), or zero for degenerate input
    #[inline]
    pub fn normalize(&self) -> Vec2 {
        let len = self.length();
        if len > 0.0001 {
            Vec2 {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Vec2::ZERO
        }
    }

    #[inline]
    pub fn scale(&self, scalar: f32) -> Vec2 {
        Vec2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Counter-clockwise perpendicular
    #[inline]
    pub fn perpendicular(&self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x.abs() < 0.0001 && self.y.abs() < 0.0001
    }

    /// Unit vector pointing at `angle` radians
    pub fn from_angle(angle: f32) -> Vec2 {
        Vec2::new(angle.cos(), angle.sin())
    }
}

/// Axis-aligned playable area used for clamping targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub min: WorldPosition,
    pub max: WorldPosition,
}

impl ArenaBounds {
    pub fn new(min: WorldPosition, max: WorldPosition) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, pos: WorldPosition) -> WorldPosition {
        WorldPosition::new(
            pos.x.clamp(self.min.x, self.max.x),
            pos.y.clamp(self.min.y, self.max.y),
        )
    }

    pub fn contains(&self, pos: &WorldPosition) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = WorldPosition::new(0.0, 0.0);
        let b = WorldPosition::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 0.001);
        assert!((a.distance_squared_to(&b) - 25.0).abs() < 0.001);
    }

    #[test]
    fn test_direction_normalization() {
        let dir = WorldPosition::ORIGIN.direction_to(&WorldPosition::new(3.0, 4.0));
        assert!((dir.length() - 1.0).abs() < 0.001);
        assert!(WorldPosition::ORIGIN.direction_to(&WorldPosition::ORIGIN).is_zero());
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = ArenaBounds::new(WorldPosition::new(50.0, 50.0), WorldPosition::new(770.0, 572.0));
        assert_eq!(bounds.clamp(WorldPosition::new(900.0, -10.0)), WorldPosition::new(770.0, 50.0));
        assert!(bounds.contains(&WorldPosition::new(100.0, 100.0)));
        assert!(!bounds.contains(&WorldPosition::new(10.0, 100.0)));
    }
}
