//! Frame orchestration for clustered light culling.

use super::binding::ClusterBindings;
use super::collect::LightCollector;
use super::cpu::{cull_reference, CpuCullResult};
use super::culling::{ClusterParams, LightCullingPass};
use super::grid::ClusterGridBuilder;
use super::index::ClusterDims;
use super::resources::ClusterResources;
use super::ClusterConfig;
use crate::core::FrameContext;
use crate::scene::Scene;

/// Per-frame telemetry counters.
///
/// Collection and grid numbers are exact every frame. The reference
/// counters are only known when the CPU culler runs; the GPU path
/// leaves them zero rather than stalling on a readback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Lights gathered from the scene this frame.
    pub lights_collected: u32,
    /// Lights dropped by the collection capacity clamp.
    pub lights_dropped: u32,
    /// Clusters in the current grid.
    pub clusters: u32,
    /// Total light references written (CPU reference path only).
    pub total_references: u32,
    /// References dropped by capacity clamps (CPU reference path only).
    pub references_dropped: u32,
    /// Largest per-cluster match count (CPU reference path only).
    pub max_lights_in_cluster: u32,
}

/// The clustered lighting system.
///
/// Owns the grid builder, collector, GPU resources, culling pass, and
/// shading bindings, and drives the per-frame sequence: collect and
/// upload lights, rebuild the grid if the projection changed, reset the
/// counter, then encode either the culling dispatch or a range clear.
pub struct ClusteredLights {
    config: ClusterConfig,
    grid: ClusterGridBuilder,
    collector: LightCollector,
    resources: ClusterResources,
    culling: LightCullingPass,
    bindings: ClusterBindings,
    stats: CullStats,
    light_count: u32,
}

impl ClusteredLights {
    /// Create the system. Buffers start sized for an empty grid and
    /// grow on the first [`prepare`](Self::prepare).
    pub fn new(device: &wgpu::Device, config: ClusterConfig) -> Self {
        let config = config.validated();
        let grid = ClusterGridBuilder::new(config.tile_size, config.depth_slices);
        let collector = LightCollector::new(config.max_lights);
        let resources = ClusterResources::new(device, &config, ClusterDims::default());
        let mut culling = LightCullingPass::new(device);
        let mut bindings = ClusterBindings::new(device);
        culling.update_bind_group(device, &resources);
        bindings.update(device, &resources, &culling);

        Self {
            config,
            grid,
            collector,
            resources,
            culling,
            bindings,
            stats: CullStats::default(),
            light_count: 0,
        }
    }

    /// CPU side of the frame: collect lights, rebuild/upload the grid
    /// if needed, reset the counter, and upload this frame's uniforms.
    /// Must run before [`encode`](Self::encode).
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &mut Scene,
        frame: &FrameContext,
    ) {
        // Grid first: dims decide buffer sizes and the params uniform.
        let rebuilt = self.grid.update(frame);
        let dims = self.grid.dims();

        if dims != self.resources.dims() {
            self.resources.resize(device, dims);
            self.culling.update_bind_group(device, &self.resources);
            self.bindings.update(device, &self.resources, &self.culling);
        }
        if rebuilt {
            self.resources.upload_bounds(queue, self.grid.bounds());
        }

        let lights = self.collector.collect(scene);
        self.light_count = self.resources.upload_lights(queue, lights);

        self.resources.reset_counter(queue);
        let params = ClusterParams::new(
            dims,
            frame,
            self.light_count,
            self.config.max_indices,
            self.config.max_lights_per_cluster,
        );
        self.culling.update_params(queue, &params);

        self.stats = CullStats {
            lights_collected: self.light_count,
            lights_dropped: self.collector.dropped(),
            clusters: dims.cluster_count(),
            ..CullStats::default()
        };
    }

    /// Encode the GPU side of the frame. With lights present this is
    /// the culling dispatch; with none it clears every range to {0, 0}
    /// so shading reads empty clusters instead of stale data. Shading
    /// passes encoded after this see the write-then-read ordering
    /// through wgpu's usage tracking.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let cluster_count = self.grid.dims().cluster_count();
        if cluster_count == 0 {
            return;
        }
        if self.light_count == 0 {
            self.resources.clear_ranges(encoder);
            return;
        }
        self.culling.dispatch(encoder, cluster_count);
    }

    /// Run the CPU reference culler over the current grid and lights
    /// and fold its counters into [`stats`](Self::stats). Intended for
    /// headless use and validation, not the per-frame hot path.
    pub fn cull_on_cpu(&mut self, frame: &FrameContext) -> CpuCullResult {
        let result = cull_reference(
            self.grid.bounds(),
            self.collector.lights(),
            &frame.view,
            &self.config,
        );
        self.stats.total_references = result.counter;
        self.stats.references_dropped = result.dropped;
        self.stats.max_lights_in_cluster = result.max_lights_in_cluster;
        result
    }

    /// Telemetry for the last prepared frame.
    #[inline]
    pub fn stats(&self) -> CullStats {
        self.stats
    }

    /// The active configuration (validated).
    #[inline]
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Current grid dimensions.
    #[inline]
    pub fn dims(&self) -> ClusterDims {
        self.grid.dims()
    }

    /// Grid builder, exposed for inspection and forced invalidation.
    #[inline]
    pub fn grid(&self) -> &ClusterGridBuilder {
        &self.grid
    }

    /// Force a grid rebuild on the next prepare (e.g. after the host
    /// renderer recreates its swapchain).
    pub fn invalidate_grid(&mut self) {
        self.grid.invalidate();
    }

    /// GPU buffers, exposed for readback in tests and tools.
    #[inline]
    pub fn resources(&self) -> &ClusterResources {
        &self.resources
    }

    /// Read-only bindings for shading passes.
    #[inline]
    pub fn bindings(&self) -> &ClusterBindings {
        &self.bindings
    }
}
