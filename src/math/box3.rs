//! Axis-aligned bounding box implementation.

use super::{Sphere, Vector3};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (AABB).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box3 {
    /// Minimum corner.
    pub min: Vector3,
    /// Maximum corner.
    pub max: Vector3,
}

impl Default for Box3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box3 {
    /// Empty box (inverted, ready to expand).
    pub const EMPTY: Self = Self {
        min: Vector3 { x: f32::INFINITY, y: f32::INFINITY, z: f32::INFINITY },
        max: Vector3 { x: f32::NEG_INFINITY, y: f32::NEG_INFINITY, z: f32::NEG_INFINITY },
    };

    /// Create a new box.
    #[inline]
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Create a box from an array of points.
    pub fn from_points(points: &[Vector3]) -> Self {
        let mut result = Self::EMPTY;
        for p in points {
            result.expand_by_point(p);
        }
        result
    }

    /// Check if the box is empty (inverted).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Get the size of the box.
    #[inline]
    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Expand the box to include a point.
    pub fn expand_by_point(&mut self, p: &Vector3) -> &mut Self {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
        self
    }

    /// Check if a point is inside the box.
    pub fn contains_point(&self, p: &Vector3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Clamp a point to the box.
    pub fn clamp_point(&self, p: &Vector3) -> Vector3 {
        p.clamp(&self.min, &self.max)
    }

    /// Check if the box intersects a sphere.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        // Closest point in the box to the sphere center
        let closest = self.clamp_point(&sphere.center);
        closest.distance_to_squared(&sphere.center) <= sphere.radius * sphere.radius
    }

    /// Get the 8 corners of the box.
    pub fn corners(&self) -> [Vector3; 8] {
        [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Check if approximately equal to another box.
    pub fn approx_eq(&self, other: &Box3, epsilon: f32) -> bool {
        self.min.approx_eq(&other.min, epsilon) && self.max.approx_eq(&other.max, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expand() {
        let mut b = Box3::EMPTY;
        assert!(b.is_empty());
        b.expand_by_point(&Vector3::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert!(b.min.approx_eq(&Vector3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(b.max.approx_eq(&Vector3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_from_points() {
        let b = Box3::from_points(&[
            Vector3::new(-1.0, 5.0, 0.0),
            Vector3::new(2.0, -3.0, 4.0),
            Vector3::new(0.0, 0.0, -2.0),
        ]);
        assert!(b.min.approx_eq(&Vector3::new(-1.0, -3.0, -2.0), 1e-6));
        assert!(b.max.approx_eq(&Vector3::new(2.0, 5.0, 4.0), 1e-6));
    }

    #[test]
    fn test_contains_point() {
        let b = Box3::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        assert!(b.contains_point(&Vector3::ZERO));
        assert!(b.contains_point(&Vector3::new(1.0, 1.0, 1.0)));
        assert!(!b.contains_point(&Vector3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn test_intersects_sphere() {
        let b = Box3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
        // Sphere touching a face
        assert!(b.intersects_sphere(&Sphere::new(Vector3::new(3.0, 1.0, 1.0), 1.0)));
        // Sphere clearly outside
        assert!(!b.intersects_sphere(&Sphere::new(Vector3::new(5.0, 5.0, 5.0), 1.0)));
        // Near a corner the center-to-corner distance matters, not per-axis distance
        let d = Vector3::new(3.0, 3.0, 3.0).distance_to(&Vector3::new(2.0, 2.0, 2.0));
        assert!(b.intersects_sphere(&Sphere::new(Vector3::new(3.0, 3.0, 3.0), d + 0.01)));
        assert!(!b.intersects_sphere(&Sphere::new(Vector3::new(3.0, 3.0, 3.0), d - 0.01)));
    }
}
