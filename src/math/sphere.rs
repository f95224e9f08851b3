//! Bounding sphere implementation.

use super::{Box3, Vector3};
use serde::{Deserialize, Serialize};

/// A bounding sphere defined by center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Vector3,
    /// Radius of the sphere.
    pub radius: f32,
}

impl Sphere {
    /// Unit sphere at origin.
    pub const UNIT: Self = Self { center: Vector3::ZERO, radius: 1.0 };

    /// Create a new sphere.
    #[inline]
    pub const fn new(center: Vector3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if the sphere is empty (non-positive radius).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0
    }

    /// Check if a point is inside the sphere.
    pub fn contains_point(&self, p: &Vector3) -> bool {
        p.distance_to_squared(&self.center) <= self.radius * self.radius
    }

    /// Check if the sphere intersects a box.
    pub fn intersects_box(&self, box3: &Box3) -> bool {
        box3.intersects_sphere(self)
    }

    /// Translate the sphere by an offset.
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            center: self.center + *offset,
            radius: self.radius,
        }
    }
}
