//! # Math Module
//!
//! 3D mathematics for the Candela engine: vectors, matrices, quaternions,
//! colors, and bounding volumes, with a Three.js-like API and `glam`
//! conversions where interop is useful.
//!
//! Matrices are column-major; projection matrices target the wgpu/Vulkan
//! 0..1 depth range.

mod vector3;
mod matrix4;
mod quaternion;
mod color;
mod sphere;
mod box3;

pub use vector3::Vector3;
pub use matrix4::Matrix4;
pub use quaternion::Quaternion;
pub use color::Color;
pub use sphere::Sphere;
pub use box3::Box3;
