//! Cluster grid construction.
//!
//! Builds one view-space AABB per cluster from the camera projection.
//! The grid depends only on projection parameters and viewport size,
//! never on scene content, so it is rebuilt only when those change.

use super::index::{slice_near_depth, ClusterDims};
use crate::core::FrameContext;
use crate::math::{Box3, Vector3};
use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;

/// View-space AABB of one cluster (32 bytes, matches WGSL layout).
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Default)]
#[repr(C)]
pub struct ClusterBounds {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Padding (vec3 rounds up to 16 bytes in WGSL).
    pub _pad0: f32,
    /// Maximum corner.
    pub max: [f32; 3],
    /// Padding.
    pub _pad1: f32,
}

impl ClusterBounds {
    /// Squared distance from a point to the box (0 inside).
    pub fn distance_squared(&self, p: [f32; 3]) -> f32 {
        let mut d = 0.0;
        for i in 0..3 {
            let v = p[i].clamp(self.min[i], self.max[i]) - p[i];
            d += v * v;
        }
        d
    }

    /// Sphere-vs-box intersection via the closest-point test.
    #[inline]
    pub fn intersects_sphere(&self, center: [f32; 3], radius: f32) -> bool {
        self.distance_squared(center) <= radius * radius
    }
}

/// Camera parameters the grid depends on, kept for dirty-checking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct GridParams {
    fov_y: f32,
    near: f32,
    far: f32,
    width: u32,
    height: u32,
}

/// Change threshold below which a projection parameter counts as stable.
const PARAM_EPSILON: f32 = 1e-3;

impl GridParams {
    fn of(frame: &FrameContext) -> Self {
        Self {
            fov_y: frame.fov_y,
            near: frame.near,
            far: frame.far,
            width: frame.width,
            height: frame.height,
        }
    }

    fn matches(&self, other: &Self) -> bool {
        (self.fov_y - other.fov_y).abs() <= PARAM_EPSILON
            && (self.near - other.near).abs() <= PARAM_EPSILON
            && (self.far - other.far).abs() <= PARAM_EPSILON
            && self.width == other.width
            && self.height == other.height
    }
}

/// Builds and caches per-cluster view-space AABBs.
///
/// `update` is cheap when nothing changed; an actual rebuild unprojects
/// the tile corners onto the near plane once per screen tile and scales
/// the corner rays to every slice's depth bounds.
pub struct ClusterGridBuilder {
    dims: ClusterDims,
    bounds: Vec<ClusterBounds>,
    last_params: Option<GridParams>,
    force_rebuild: bool,
    rebuild_count: u64,
    tile_size: u32,
    slices: u32,
}

impl ClusterGridBuilder {
    /// Create a builder for the given tile size and slice count.
    /// No grid exists until the first [`update`](Self::update).
    pub fn new(tile_size: u32, slices: u32) -> Self {
        Self {
            dims: ClusterDims::default(),
            bounds: Vec::new(),
            last_params: None,
            force_rebuild: false,
            rebuild_count: 0,
            tile_size,
            slices,
        }
    }

    /// Current grid dimensions.
    #[inline]
    pub fn dims(&self) -> ClusterDims {
        self.dims
    }

    /// Per-cluster AABBs, indexed by flattened cluster id.
    /// Empty until the first rebuild.
    #[inline]
    pub fn bounds(&self) -> &[ClusterBounds] {
        &self.bounds
    }

    /// Number of rebuilds performed so far.
    #[inline]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Force the next [`update`](Self::update) to rebuild.
    pub fn invalidate(&mut self) {
        self.force_rebuild = true;
    }

    /// Rebuild the grid if the projection or viewport changed.
    /// Returns true when a rebuild actually happened.
    pub fn update(&mut self, frame: &FrameContext) -> bool {
        let params = GridParams::of(frame);
        let unchanged = self
            .last_params
            .as_ref()
            .map(|last| last.matches(&params))
            .unwrap_or(false);
        if unchanged && !self.force_rebuild {
            return false;
        }

        debug_assert!(frame.near > 0.0 && frame.far > frame.near);

        self.dims =
            ClusterDims::from_viewport(frame.width, frame.height, self.tile_size, self.slices);
        self.rebuild(frame);
        self.last_params = Some(params);
        self.force_rebuild = false;
        self.rebuild_count += 1;
        log::debug!(
            "Cluster grid rebuilt: {}x{}x{} ({} clusters)",
            self.dims.tiles_x,
            self.dims.tiles_y,
            self.dims.slices,
            self.dims.cluster_count()
        );
        true
    }

    fn rebuild(&mut self, frame: &FrameContext) {
        let dims = self.dims;
        let inv_proj = frame.inverse_projection;
        let (near, far) = (frame.near, frame.far);
        let (width, height) = (frame.width as f32, frame.height as f32);
        let tile = dims.tile_size as f32;

        self.bounds = (0..dims.cluster_count())
            .into_par_iter()
            .map(|id| {
                let (x, y, z) = dims.unflatten(id);

                // Tile corners in NDC. Screen y grows downward, NDC y upward.
                let x0 = (x as f32 * tile / width) * 2.0 - 1.0;
                let x1 = ((x + 1) as f32 * tile / width) * 2.0 - 1.0;
                let y0 = 1.0 - (y as f32 * tile / height) * 2.0;
                let y1 = 1.0 - ((y + 1) as f32 * tile / height) * 2.0;

                // Unproject onto the near plane (NDC depth 0 in wgpu),
                // where view-space z is exactly -near. The eye sits at the
                // view-space origin, so the point at depth d along a corner
                // ray is the near-plane corner scaled by d / near.
                let corners = [
                    Vector3::new(x0, y0, 0.0),
                    Vector3::new(x1, y0, 0.0),
                    Vector3::new(x0, y1, 0.0),
                    Vector3::new(x1, y1, 0.0),
                ]
                .map(|ndc| inv_proj.transform_point(&ndc));

                let slice_near = slice_near_depth(z, near, far, dims.slices);
                let slice_far = slice_near_depth(z + 1, near, far, dims.slices);

                let mut aabb = Box3::EMPTY;
                for corner in &corners {
                    aabb.expand_by_point(&(*corner * (slice_near / near)));
                    aabb.expand_by_point(&(*corner * (slice_far / near)));
                }

                ClusterBounds {
                    min: aabb.min.to_array(),
                    _pad0: 0.0,
                    max: aabb.max.to_array(),
                    _pad1: 0.0,
                }
            })
            .collect();
    }
}
