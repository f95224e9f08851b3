//! Clustered forward+ light culling.
//!
//! Subdivides the camera frustum into a 3D grid of clusters (screen
//! tiles times exponential depth slices) and assigns each visible
//! light to the clusters its influence volume touches, producing
//! compact per-cluster light lists that shading passes index by pixel
//! position.
//!
//! ## Architecture
//!
//! 1. **Collection**: scene lights are flattened into `GpuLight` records
//! 2. **Grid build**: per-cluster view-space AABBs, rebuilt only when the
//!    projection or viewport changes
//! 3. **GPU culling**: a compute dispatch tests every light against every
//!    cluster AABB and claims index ranges through one atomic counter
//! 4. **Binding**: the range/index/light buffers are exposed read-only to
//!    downstream shading

mod binding;
mod collect;
mod cpu;
mod culling;
mod grid;
mod index;
mod pipeline;
mod resources;

pub use binding::{compose_cluster_shader, ClusterBindings, CLUSTER_COMMON_WGSL};
pub use collect::LightCollector;
pub use cpu::{cull_reference, CpuCullResult};
pub use culling::{ClusterParams, LightCullingPass};
pub use grid::{ClusterBounds, ClusterGridBuilder};
pub use index::{
    depth_slice_bias, depth_slice_scale, slice_near_depth, view_depth_to_slice, ClusterDims,
};
pub use pipeline::{ClusteredLights, CullStats};
pub use resources::{ClusterLightRange, ClusterResources};

/// Hard upper bound on per-cluster light matches.
/// Mirrors the fixed local list size in the culling kernel.
pub const MAX_LIGHTS_PER_CLUSTER: u32 = 128;

/// Configuration for the clustered lighting system.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Screen-space tile size in pixels (X/Y grid resolution driver).
    pub tile_size: u32,
    /// Number of exponential depth slices.
    pub depth_slices: u32,
    /// Maximum number of collected lights per frame.
    pub max_lights: u32,
    /// Capacity of the compacted light index list (total references
    /// across all clusters).
    pub max_indices: u32,
    /// Maximum lights assigned to a single cluster.
    pub max_lights_per_cluster: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            depth_slices: 16,
            max_lights: 1024,
            max_indices: 65536,
            max_lights_per_cluster: MAX_LIGHTS_PER_CLUSTER,
        }
    }
}

impl ClusterConfig {
    /// Clamp out-of-range values and return a usable configuration.
    /// Every clamp is logged so silent misconfiguration is visible.
    pub fn validated(mut self) -> Self {
        if self.tile_size == 0 {
            log::warn!("Cluster tile_size of 0 clamped to 1");
            self.tile_size = 1;
        }
        if self.depth_slices == 0 {
            log::warn!("Cluster depth_slices of 0 clamped to 1");
            self.depth_slices = 1;
        }
        if self.max_lights == 0 {
            log::warn!("Cluster max_lights of 0 clamped to 1");
            self.max_lights = 1;
        }
        if self.max_indices == 0 {
            log::warn!("Cluster max_indices of 0 clamped to 1");
            self.max_indices = 1;
        }
        if self.max_lights_per_cluster == 0 {
            log::warn!("Cluster max_lights_per_cluster of 0 clamped to 1");
            self.max_lights_per_cluster = 1;
        }
        if self.max_lights_per_cluster > MAX_LIGHTS_PER_CLUSTER {
            log::warn!(
                "Cluster max_lights_per_cluster {} exceeds kernel limit {}, clamping",
                self.max_lights_per_cluster,
                MAX_LIGHTS_PER_CLUSTER
            );
            self.max_lights_per_cluster = MAX_LIGHTS_PER_CLUSTER;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FrameContext;
    use crate::light::GpuLight;
    use crate::math::{Matrix4, Vector3};

    fn built_grid() -> (ClusterGridBuilder, FrameContext) {
        let proj = Matrix4::perspective(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        let frame = FrameContext::new(Matrix4::IDENTITY, proj, 1280, 720, 60.0, 0.1, 100.0);
        let mut builder = ClusterGridBuilder::new(32, 16);
        builder.update(&frame);
        (builder, frame)
    }

    /// Unprojects a pixel onto the near plane and scales the ray to the
    /// requested view depth, matching the grid builder's construction.
    fn view_point_of_pixel(frame: &FrameContext, px: f32, py: f32, depth: f32) -> Vector3 {
        let ndc = Vector3::new(
            (px / frame.width as f32) * 2.0 - 1.0,
            1.0 - (py / frame.height as f32) * 2.0,
            0.0,
        );
        frame.inverse_projection.transform_point(&ndc) * (depth / frame.near)
    }

    #[test]
    fn test_pixel_cluster_contains_unprojected_point() {
        let (builder, frame) = built_grid();
        let dims = builder.dims();

        // Interior depths only; boundary depths may legally round to
        // either adjacent slice.
        for &(px, py) in &[(16.0, 16.0), (640.0, 360.0), (1100.5, 700.25), (0.5, 719.5)] {
            for &depth in &[0.15, 1.0, 7.3, 42.0, 95.0] {
                let id = dims.cluster_from_screen(px, py, depth, frame.near, frame.far);
                let aabb = builder.bounds()[id as usize];
                let p = view_point_of_pixel(&frame, px, py, depth);
                assert!(
                    p.x >= aabb.min[0] - 1e-3
                        && p.x <= aabb.max[0] + 1e-3
                        && p.y >= aabb.min[1] - 1e-3
                        && p.y <= aabb.max[1] + 1e-3
                        && p.z >= aabb.min[2] - 1e-3
                        && p.z <= aabb.max[2] + 1e-3,
                    "pixel ({px}, {py}) at depth {depth} landed outside its cluster"
                );
            }
        }
    }

    #[test]
    fn test_origin_light_scenario() {
        let (builder, frame) = built_grid();
        let dims = builder.dims();
        assert_eq!(dims.cluster_count(), 14720);

        // A point light at the view-space origin with range 5 reaches
        // at most depth 5, so every matched cluster must sit in a slice
        // whose near boundary is below that depth.
        let light = GpuLight {
            position: [0.0, 0.0, 0.0],
            range: 5.0,
            ..Default::default()
        };
        let result = cull_reference(
            builder.bounds(),
            &[light],
            &frame.view,
            &ClusterConfig::default(),
        );

        let scale = depth_slice_scale(frame.near, frame.far, dims.slices);
        let bias = depth_slice_bias(frame.near, frame.far, dims.slices);
        let max_slice = view_depth_to_slice(5.0, scale, bias, dims.slices);

        let mut matched = 0u32;
        for (cluster, aabb) in builder.bounds().iter().enumerate() {
            let expected = aabb.intersects_sphere([0.0, 0.0, 0.0], 5.0);
            let got = result.ranges[cluster].count > 0;
            assert_eq!(expected, got, "cluster {cluster} assignment mismatch");
            if got {
                matched += 1;
                let (_, _, z) = dims.unflatten(cluster as u32);
                assert!(z <= max_slice);
            }
        }
        assert!(matched > 0);
        assert_eq!(result.counter, matched);
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = ClusterConfig {
            tile_size: 16,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ClusterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tile_size, 16);
        assert_eq!(back.max_indices, config.max_indices);
    }

    #[test]
    fn test_config_validation_clamps() {
        let config = ClusterConfig {
            tile_size: 0,
            max_lights_per_cluster: 4096,
            ..Default::default()
        }
        .validated();
        assert_eq!(config.tile_size, 1);
        assert_eq!(config.max_lights_per_cluster, MAX_LIGHTS_PER_CLUSTER);
    }
}
