//! Lighting module.
//!
//! Lights live on scene nodes as [`LightComponent`] values and are
//! flattened into [`GpuLight`] records once per frame before culling.

mod point;
mod spot;

pub use point::PointLight;
pub use spot::SpotLight;

use crate::math::{Quaternion, Sphere, Vector3};
use bytemuck::{Pod, Zeroable};

/// Light type identifier for GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LightType {
    /// Point light (omni-directional).
    Point = 0,
    /// Spot light (cone-shaped).
    Spot = 1,
}

/// GPU-friendly light data structure (64 bytes).
///
/// Positions and directions are in world space; the culling kernel
/// applies the view matrix itself. Cone angles are stored as cosines
/// of the half-angle so shaders never touch transcendentals.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct GpuLight {
    /// World-space light position.
    pub position: [f32; 3],
    /// Range (distance at which intensity falls to zero).
    pub range: f32,
    /// Light color.
    pub color: [f32; 3],
    /// Light intensity.
    pub intensity: f32,
    /// World-space direction (spot lights only).
    pub direction: [f32; 3],
    /// Light type (0=point, 1=spot).
    pub light_type: u32,
    /// Cosine of the inner cone half-angle (spot lights only).
    pub inner_cone_cos: f32,
    /// Cosine of the outer cone half-angle (spot lights only).
    pub outer_cone_cos: f32,
    /// Padding to 64 bytes (matches WGSL struct layout).
    pub _pad: [f32; 2],
}

impl Default for GpuLight {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            range: 10.0,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            direction: [0.0, 0.0, -1.0],
            light_type: LightType::Point as u32,
            inner_cone_cos: 1.0,
            outer_cone_cos: 1.0,
            _pad: [0.0; 2],
        }
    }
}

impl GpuLight {
    /// Bounding sphere of the light's influence volume.
    ///
    /// Spot lights use the same sphere as point lights. That
    /// over-includes clusters behind the cone, which is fine for
    /// culling: shading re-tests the precise cone per pixel.
    pub fn influence_sphere(&self) -> Sphere {
        Sphere::new(Vector3::from(self.position), self.range)
    }
}

/// A light attached to a scene node.
///
/// The node supplies the world transform; the component supplies the
/// photometric parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum LightComponent {
    /// Omni-directional point light.
    Point(PointLight),
    /// Cone-shaped spot light.
    Spot(SpotLight),
}

impl LightComponent {
    /// Flatten into a GPU record using the node's world transform.
    ///
    /// Spot lights emit along the node's forward axis (negative Z)
    /// rotated into world space. Cone angles are converted here, once
    /// per collection, from degrees to half-angle cosines.
    pub fn to_gpu_light(&self, world_position: Vector3, world_rotation: &Quaternion) -> GpuLight {
        match self {
            LightComponent::Point(light) => GpuLight {
                position: world_position.to_array(),
                range: light.range,
                color: light.color.to_array(),
                intensity: light.intensity,
                direction: [0.0, 0.0, -1.0],
                light_type: LightType::Point as u32,
                inner_cone_cos: 1.0,
                outer_cone_cos: 1.0,
                _pad: [0.0; 2],
            },
            LightComponent::Spot(light) => {
                // Re-normalize in case the rotation came from a
                // non-unit-scale transform decomposition.
                let direction = Vector3::FORWARD.apply_quaternion(world_rotation).normalized();
                GpuLight {
                    position: world_position.to_array(),
                    range: light.range,
                    color: light.color.to_array(),
                    intensity: light.intensity,
                    direction: direction.to_array(),
                    light_type: LightType::Spot as u32,
                    inner_cone_cos: (light.inner_angle().to_radians() * 0.5).cos(),
                    outer_cone_cos: (light.outer_angle().to_radians() * 0.5).cos(),
                    _pad: [0.0; 2],
                }
            }
        }
    }

    /// Range of the light's influence volume.
    #[inline]
    pub fn range(&self) -> f32 {
        match self {
            LightComponent::Point(light) => light.range,
            LightComponent::Spot(light) => light.range,
        }
    }
}

impl From<PointLight> for LightComponent {
    fn from(light: PointLight) -> Self {
        Self::Point(light)
    }
}

impl From<SpotLight> for LightComponent {
    fn from(light: SpotLight) -> Self {
        Self::Spot(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;

    #[test]
    fn test_gpu_light_size() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 64);
    }

    #[test]
    fn test_point_to_gpu_light() {
        let component = LightComponent::Point(PointLight::new(Color::RED, 2.0, 8.0));
        let gpu = component.to_gpu_light(Vector3::new(1.0, 2.0, 3.0), &Quaternion::IDENTITY);
        assert_eq!(gpu.light_type, LightType::Point as u32);
        assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.range, 8.0);
        assert_eq!(gpu.intensity, 2.0);
    }

    #[test]
    fn test_spot_direction_follows_rotation() {
        let component = LightComponent::Spot(SpotLight::default());
        // Quarter turn about X points the forward axis down
        let rotation =
            Quaternion::from_axis_angle(&Vector3::UNIT_X, -std::f32::consts::FRAC_PI_2);
        let gpu = component.to_gpu_light(Vector3::ZERO, &rotation);
        let direction = Vector3::from(gpu.direction);
        assert!(direction.approx_eq(&Vector3::new(0.0, -1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_spot_cone_cosines() {
        let mut spot = SpotLight::default();
        spot.set_angles(60.0, 90.0);
        let component = LightComponent::Spot(spot);
        let gpu = component.to_gpu_light(Vector3::ZERO, &Quaternion::IDENTITY);
        // Half-angle cosines: cos(30 deg) and cos(45 deg)
        assert!((gpu.inner_cone_cos - 30.0_f32.to_radians().cos()).abs() < 1e-6);
        assert!((gpu.outer_cone_cos - 45.0_f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn test_influence_sphere() {
        let gpu = GpuLight {
            position: [0.0, 5.0, 0.0],
            range: 3.0,
            ..Default::default()
        };
        let sphere = gpu.influence_sphere();
        assert!(sphere.contains_point(&Vector3::new(0.0, 7.5, 0.0)));
        assert!(!sphere.contains_point(&Vector3::new(0.0, 8.5, 0.0)));
    }
}
