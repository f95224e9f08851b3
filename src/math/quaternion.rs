//! Quaternion implementation for rotations.

use super::Vector3;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A quaternion representing a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Quaternion {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component (scalar).
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// Identity quaternion (no rotation).
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a new quaternion.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from an axis and angle (radians).
    /// The axis is assumed to be normalized.
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        let half = angle / 2.0;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// Length (magnitude) of the quaternion.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Normalize in place.
    pub fn normalize(&mut self) -> &mut Self {
        let len = self.length();
        if len > 0.0 {
            let inv = 1.0 / len;
            self.x *= inv;
            self.y *= inv;
            self.z *= inv;
            self.w *= inv;
        } else {
            *self = Self::IDENTITY;
        }
        self
    }

    /// Return a normalized copy.
    pub fn normalized(&self) -> Self {
        let mut q = *self;
        q.normalize();
        q
    }

    /// Return the conjugate (inverse rotation for unit quaternions).
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Multiply this quaternion by another (applies `other` first, then `self`).
    pub fn multiply(&self, other: &Quaternion) -> Self {
        let qax = self.x;
        let qay = self.y;
        let qaz = self.z;
        let qaw = self.w;
        let qbx = other.x;
        let qby = other.y;
        let qbz = other.z;
        let qbw = other.w;

        Self {
            x: qax * qbw + qaw * qbx + qay * qbz - qaz * qby,
            y: qay * qbw + qaw * qby + qaz * qbx - qax * qbz,
            z: qaz * qbw + qaw * qbz + qax * qby - qay * qbx,
            w: qaw * qbw - qax * qbx - qay * qby - qaz * qbz,
        }
    }

    /// Check if approximately equal to another quaternion.
    pub fn approx_eq(&self, other: &Quaternion, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
            && (self.w - other.w).abs() < epsilon
    }
}

impl std::ops::Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl From<glam::Quat> for Quaternion {
    fn from(q: glam::Quat) -> Self {
        Self { x: q.x, y: q.y, z: q.z, w: q.w }
    }
}

impl From<Quaternion> for glam::Quat {
    fn from(q: Quaternion) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let q = Quaternion::IDENTITY;
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert!(v.apply_quaternion(&q).approx_eq(&v, 1e-6));
    }

    #[test]
    fn test_axis_angle_is_unit() {
        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, std::f32::consts::FRAC_PI_2);
        assert!((q.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_multiply_composes() {
        // Two quarter turns about Y equal a half turn
        let quarter = Quaternion::from_axis_angle(&Vector3::UNIT_Y, std::f32::consts::FRAC_PI_2);
        let half = Quaternion::from_axis_angle(&Vector3::UNIT_Y, std::f32::consts::PI);
        let composed = quarter.multiply(&quarter);
        assert!(composed.approx_eq(&half, 1e-6));
    }

    #[test]
    fn test_conjugate_undoes_rotation() {
        let q = Quaternion::from_axis_angle(&Vector3::new(0.0, 0.0, 1.0), 0.7);
        let v = Vector3::new(1.0, 0.5, -2.0);
        let rotated = v.apply_quaternion(&q);
        let back = rotated.apply_quaternion(&q.conjugate());
        assert!(back.approx_eq(&v, 1e-5));
    }
}
