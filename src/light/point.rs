//! Point light (omni-directional).

use crate::math::Color;

/// Point light emitting in all directions from its node's position.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Light range (distance at which intensity falls to zero).
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0, 10.0)
    }
}

impl PointLight {
    /// Create a new point light.
    pub fn new(color: Color, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            range,
        }
    }
}
