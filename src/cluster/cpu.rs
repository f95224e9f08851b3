//! CPU reference light culler.
//!
//! Runs the exact algorithm of `shaders/light_cull.wgsl` on the CPU:
//! rayon provides the one-thread-per-cluster parallelism and a shared
//! `AtomicU32` plays the global counter. Used as the oracle for GPU
//! tests and as a headless fallback when no adapter exists.

use super::grid::ClusterBounds;
use super::resources::ClusterLightRange;
use super::ClusterConfig;
use crate::light::GpuLight;
use crate::math::{Matrix4, Vector3};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// Output of a CPU culling pass.
#[derive(Debug)]
pub struct CpuCullResult {
    /// Per-cluster {offset, count} into `indices`.
    pub ranges: Vec<ClusterLightRange>,
    /// Compacted light index list; only the first `counter` entries
    /// are meaningful.
    pub indices: Vec<u32>,
    /// Final counter value: min(total matches, capacity).
    pub counter: u32,
    /// Matches dropped by the per-cluster or global capacity clamps.
    pub dropped: u32,
    /// Largest per-cluster match count seen (before clamping).
    pub max_lights_in_cluster: u32,
}

impl CpuCullResult {
    /// The light indices assigned to one cluster.
    pub fn cluster_lights(&self, cluster: u32) -> &[u32] {
        let range = &self.ranges[cluster as usize];
        let start = range.offset as usize;
        &self.indices[start..start + range.count as usize]
    }
}

/// Cull every light against every cluster AABB.
///
/// Light positions are world-space and transformed into view space with
/// `view` to match the AABBs. The per-cluster claim protocol (one
/// fetch-and-add, prefix write, subtract the remainder) is identical to
/// the GPU kernel, so the final counter and per-cluster sets agree with
/// it exactly up to index-list ordering.
pub fn cull_reference(
    bounds: &[ClusterBounds],
    lights: &[GpuLight],
    view: &Matrix4,
    config: &ClusterConfig,
) -> CpuCullResult {
    let capacity = config.max_indices as usize;
    let limit = config.max_lights_per_cluster as usize;

    let view_positions: Vec<[f32; 3]> = lights
        .iter()
        .map(|l| {
            view.transform_point(&Vector3::from(l.position)).to_array()
        })
        .collect();

    let counter = AtomicU32::new(0);
    let dropped = AtomicU32::new(0);
    let max_in_cluster = AtomicU32::new(0);
    let indices: Vec<AtomicU32> = (0..capacity).map(|_| AtomicU32::new(0)).collect();

    let ranges: Vec<ClusterLightRange> = bounds
        .par_iter()
        .map(|aabb| {
            let mut local = Vec::new();
            let mut matched = 0u32;
            for (i, light) in lights.iter().enumerate() {
                if aabb.intersects_sphere(view_positions[i], light.range) {
                    matched += 1;
                    if local.len() < limit {
                        local.push(i as u32);
                    }
                }
            }
            max_in_cluster.fetch_max(matched, Ordering::Relaxed);
            dropped.fetch_add(matched - local.len() as u32, Ordering::Relaxed);

            if local.is_empty() {
                return ClusterLightRange::default();
            }

            let n = local.len() as u32;
            let base = counter.fetch_add(n, Ordering::Relaxed);
            let writable = (capacity as u32).saturating_sub(base).min(n);
            if writable < n {
                counter.fetch_sub(n - writable, Ordering::Relaxed);
                dropped.fetch_add(n - writable, Ordering::Relaxed);
            }
            for (j, &light_index) in local[..writable as usize].iter().enumerate() {
                indices[base as usize + j].store(light_index, Ordering::Relaxed);
            }
            ClusterLightRange {
                offset: if writable > 0 { base } else { 0 },
                count: writable,
            }
        })
        .collect();

    CpuCullResult {
        ranges,
        indices: indices.into_iter().map(AtomicU32::into_inner).collect(),
        counter: counter.load(Ordering::Relaxed),
        dropped: dropped.load(Ordering::Relaxed),
        max_lights_in_cluster: max_in_cluster.load(Ordering::Relaxed),
    }
}
