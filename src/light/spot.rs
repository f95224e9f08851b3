//! Spot light (cone-shaped).

use crate::math::Color;

/// Spot light emitting in a cone along its node's forward axis.
///
/// Cone angles are full opening angles in degrees; the outer angle is
/// kept at or above the inner angle.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Light range.
    pub range: f32,
    /// Inner cone opening angle in degrees (full intensity).
    inner_angle: f32,
    /// Outer cone opening angle in degrees (falloff to zero).
    outer_angle: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0, 10.0, 50.0, 70.0)
    }
}

impl SpotLight {
    /// Create a new spot light.
    ///
    /// # Arguments
    /// * `color` - Light color
    /// * `intensity` - Light intensity
    /// * `range` - Maximum range
    /// * `inner_angle` - Inner cone opening angle in degrees
    /// * `outer_angle` - Outer cone opening angle in degrees
    pub fn new(color: Color, intensity: f32, range: f32, inner_angle: f32, outer_angle: f32) -> Self {
        Self {
            color,
            intensity,
            range,
            inner_angle,
            outer_angle: outer_angle.max(inner_angle),
        }
    }

    /// Get the inner cone opening angle in degrees.
    #[inline]
    pub fn inner_angle(&self) -> f32 {
        self.inner_angle
    }

    /// Get the outer cone opening angle in degrees.
    #[inline]
    pub fn outer_angle(&self) -> f32 {
        self.outer_angle
    }

    /// Set cone opening angles in degrees.
    pub fn set_angles(&mut self, inner: f32, outer: f32) {
        self.inner_angle = inner;
        self.outer_angle = outer.max(inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_never_below_inner() {
        let mut spot = SpotLight::default();
        spot.set_angles(80.0, 40.0);
        assert_eq!(spot.inner_angle(), 80.0);
        assert_eq!(spot.outer_angle(), 80.0);
    }
}
