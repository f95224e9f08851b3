//! Cluster grid dimensions and the canonical index math.
//!
//! The slice distribution and flattening formulas here are the single
//! CPU-side source of truth; `shaders/cluster_common.wgsl` mirrors them
//! for GPU code. Grid construction and pixel lookup must agree exactly
//! or shading silently reads the wrong cluster.

/// Dimensions of the cluster grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClusterDims {
    /// Clusters along screen X.
    pub tiles_x: u32,
    /// Clusters along screen Y.
    pub tiles_y: u32,
    /// Depth slices.
    pub slices: u32,
    /// Tile size in pixels.
    pub tile_size: u32,
}

impl ClusterDims {
    /// Derive grid dimensions from a viewport.
    ///
    /// Edge tiles may extend past the viewport when the resolution is
    /// not a multiple of the tile size; the overhang is kept rather
    /// than clamped so all tiles have identical screen extent.
    pub fn from_viewport(width: u32, height: u32, tile_size: u32, slices: u32) -> Self {
        Self {
            tiles_x: (width + tile_size - 1) / tile_size,
            tiles_y: (height + tile_size - 1) / tile_size,
            slices,
            tile_size,
        }
    }

    /// Total number of clusters.
    #[inline]
    pub fn cluster_count(&self) -> u32 {
        self.tiles_x * self.tiles_y * self.slices
    }

    /// Flatten (x, y, z) grid coordinates into a cluster id.
    #[inline]
    pub fn flatten(&self, x: u32, y: u32, z: u32) -> u32 {
        x + y * self.tiles_x + z * self.tiles_x * self.tiles_y
    }

    /// Split a cluster id back into (x, y, z) grid coordinates.
    #[inline]
    pub fn unflatten(&self, cluster: u32) -> (u32, u32, u32) {
        let per_slice = self.tiles_x * self.tiles_y;
        let z = cluster / per_slice;
        let rem = cluster % per_slice;
        (rem % self.tiles_x, rem / self.tiles_x, z)
    }

    /// Screen tile containing a pixel position, clamped to the grid.
    #[inline]
    pub fn tile_of(&self, px: f32, py: f32) -> (u32, u32) {
        let x = ((px / self.tile_size as f32).floor().max(0.0) as u32).min(self.tiles_x - 1);
        let y = ((py / self.tile_size as f32).floor().max(0.0) as u32).min(self.tiles_y - 1);
        (x, y)
    }

    /// Cluster id for a pixel at the given positive view-space depth.
    /// This is the lookup a shading pass performs per pixel.
    pub fn cluster_from_screen(&self, px: f32, py: f32, view_depth: f32, near: f32, far: f32) -> u32 {
        let (x, y) = self.tile_of(px, py);
        let scale = depth_slice_scale(near, far, self.slices);
        let bias = depth_slice_bias(near, far, self.slices);
        let z = view_depth_to_slice(view_depth, scale, bias, self.slices);
        self.flatten(x, y, z)
    }
}

/// Scale term of the exponential depth-to-slice mapping.
#[inline]
pub fn depth_slice_scale(near: f32, far: f32, slices: u32) -> f32 {
    slices as f32 / (far / near).ln()
}

/// Bias term of the exponential depth-to-slice mapping.
#[inline]
pub fn depth_slice_bias(near: f32, far: f32, slices: u32) -> f32 {
    -(slices as f32) * near.ln() / (far / near).ln()
}

/// Near boundary depth of a slice.
///
/// Slices are distributed exponentially: slice i begins at
/// `near * (far/near)^(i/slices)`, so each slice covers the same ratio
/// of depth. `slice_near_depth(slices)` is exactly `far`.
#[inline]
pub fn slice_near_depth(slice: u32, near: f32, far: f32, slices: u32) -> f32 {
    near * (far / near).powf(slice as f32 / slices as f32)
}

/// Map a positive view-space depth to its slice index.
///
/// Inverse of [`slice_near_depth`]. Uses floor, so a depth exactly on
/// a boundary lands in the slice that begins there; out-of-range
/// depths clamp to the first or last slice.
#[inline]
pub fn view_depth_to_slice(depth: f32, scale: f32, bias: f32, slices: u32) -> u32 {
    let slice = (depth.max(1e-6).ln() * scale + bias).floor();
    (slice.max(0.0) as u32).min(slices - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_grid_dimensions() {
        let dims = ClusterDims::from_viewport(1280, 720, 32, 16);
        assert_eq!(dims.tiles_x, 40);
        assert_eq!(dims.tiles_y, 23);
        assert_eq!(dims.slices, 16);
        assert_eq!(dims.cluster_count(), 14720);
    }

    #[test]
    fn test_flatten_unflatten_round_trip() {
        let dims = ClusterDims::from_viewport(1280, 720, 32, 16);
        for &(x, y, z) in &[(0, 0, 0), (39, 22, 15), (17, 5, 9)] {
            let id = dims.flatten(x, y, z);
            assert_eq!(dims.unflatten(id), (x, y, z));
        }
        assert_eq!(dims.flatten(39, 22, 15), dims.cluster_count() - 1);
    }

    #[test]
    fn test_slice_boundaries_span_depth_range() {
        let (near, far, slices) = (0.1, 100.0, 16);
        assert!((slice_near_depth(0, near, far, slices) - near).abs() < 1e-6);
        assert!((slice_near_depth(slices, near, far, slices) - far).abs() < 1e-3);
        // Boundaries are strictly increasing
        for i in 0..slices {
            assert!(
                slice_near_depth(i, near, far, slices) < slice_near_depth(i + 1, near, far, slices)
            );
        }
    }

    #[test]
    fn test_depth_to_slice_inverts_boundaries() {
        let (near, far, slices) = (0.1, 100.0, 16);
        let scale = depth_slice_scale(near, far, slices);
        let bias = depth_slice_bias(near, far, slices);

        // A depth strictly inside slice i (geometric mean of its
        // boundaries) must map back to slice i.
        for i in 0..slices {
            let lo = slice_near_depth(i, near, far, slices);
            let hi = slice_near_depth(i + 1, near, far, slices);
            let mid = (lo * hi).sqrt();
            assert_eq!(view_depth_to_slice(mid, scale, bias, slices), i);
        }
    }

    #[test]
    fn test_depth_to_slice_clamps_out_of_range() {
        let (near, far, slices) = (0.1, 100.0, 16);
        let scale = depth_slice_scale(near, far, slices);
        let bias = depth_slice_bias(near, far, slices);
        assert_eq!(view_depth_to_slice(0.001, scale, bias, slices), 0);
        assert_eq!(view_depth_to_slice(5000.0, scale, bias, slices), slices - 1);
    }

    #[test]
    fn test_tile_of_clamps_to_grid() {
        let dims = ClusterDims::from_viewport(1280, 720, 32, 16);
        assert_eq!(dims.tile_of(0.0, 0.0), (0, 0));
        assert_eq!(dims.tile_of(640.0, 360.0), (20, 11));
        // 720 is inside the overhanging last tile row
        assert_eq!(dims.tile_of(1279.0, 719.0), (39, 22));
        assert_eq!(dims.tile_of(5000.0, 5000.0), (39, 22));
    }
}
