//! GPU light culling compute pass.

use super::binding::compose_cluster_shader;
use super::index::{depth_slice_bias, depth_slice_scale, ClusterDims};
use super::resources::ClusterResources;
use crate::core::FrameContext;
use bytemuck::{Pod, Zeroable};

/// Uniform parameters for the culling kernel and shading lookups
/// (112 bytes, matches the WGSL `ClusterParams` struct).
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct ClusterParams {
    /// World-to-view matrix.
    pub view: [[f32; 4]; 4],
    /// Clusters along screen X.
    pub tiles_x: u32,
    /// Clusters along screen Y.
    pub tiles_y: u32,
    /// Depth slices.
    pub slices: u32,
    /// Tile size in pixels.
    pub tile_size: u32,
    /// Number of lights uploaded this frame.
    pub light_count: u32,
    /// Capacity of the compacted index list.
    pub max_indices: u32,
    /// Per-cluster local list bound.
    pub max_per_cluster: u32,
    /// Total clusters in the grid.
    pub cluster_count: u32,
    /// Scale of the exponential depth-to-slice mapping.
    pub depth_scale: f32,
    /// Bias of the exponential depth-to-slice mapping.
    pub depth_bias: f32,
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            view: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            tiles_x: 0,
            tiles_y: 0,
            slices: 0,
            tile_size: 0,
            light_count: 0,
            max_indices: 0,
            max_per_cluster: 0,
            cluster_count: 0,
            depth_scale: 0.0,
            depth_bias: 0.0,
            near: 0.0,
            far: 0.0,
        }
    }
}

impl ClusterParams {
    /// Build the frame's parameters from the grid, frame, and limits.
    pub fn new(
        dims: ClusterDims,
        frame: &FrameContext,
        light_count: u32,
        max_indices: u32,
        max_per_cluster: u32,
    ) -> Self {
        Self {
            view: frame.view.to_cols_array_2d(),
            tiles_x: dims.tiles_x,
            tiles_y: dims.tiles_y,
            slices: dims.slices,
            tile_size: dims.tile_size,
            light_count,
            max_indices,
            max_per_cluster,
            cluster_count: dims.cluster_count(),
            depth_scale: depth_slice_scale(frame.near, frame.far, dims.slices),
            depth_bias: depth_slice_bias(frame.near, frame.far, dims.slices),
            near: frame.near,
            far: frame.far,
        }
    }
}

/// Owns the culling compute pipeline and its bind group.
pub struct LightCullingPass {
    /// Compute pipeline for light culling.
    pipeline: wgpu::ComputePipeline,
    /// Bind group layout for the culling kernel.
    bind_group_layout: wgpu::BindGroupLayout,
    /// Uniform buffer holding [`ClusterParams`].
    params_buffer: wgpu::Buffer,
    /// Bind group (recreated when the grid buffers are reallocated).
    bind_group: Option<wgpu::BindGroup>,
}

impl LightCullingPass {
    /// Create the culling pipeline.
    pub fn new(device: &wgpu::Device) -> Self {
        let source = compose_cluster_shader(include_str!("../shaders/light_cull.wgsl"));
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Light Cull Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Light Cull Bind Group Layout"),
            entries: &[
                // Params uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Cluster AABBs (read)
                storage_entry(1, true),
                // Lights (read)
                storage_entry(2, true),
                // Ranges (write)
                storage_entry(3, false),
                // Compacted indices (write)
                storage_entry(4, false),
                // Atomic counter
                storage_entry(5, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Light Cull Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Light Cull Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Cull Params Buffer"),
            size: std::mem::size_of::<ClusterParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            params_buffer,
            bind_group: None,
        }
    }

    /// Create or refresh the bind group over the current buffers.
    pub fn update_bind_group(&mut self, device: &wgpu::Device, resources: &ClusterResources) {
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Light Cull Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: resources.bounds_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: resources.light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: resources.range_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: resources.index_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: resources.counter_buffer.as_entire_binding(),
                },
            ],
        }));
    }

    /// Upload this frame's parameters.
    pub fn update_params(&self, queue: &wgpu::Queue, params: &ClusterParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[*params]));
    }

    /// The params uniform buffer, shared with shading bind groups.
    #[inline]
    pub fn params_buffer(&self) -> &wgpu::Buffer {
        &self.params_buffer
    }

    /// Encode the culling dispatch, one invocation per cluster.
    /// No-op until a bind group exists.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, cluster_count: u32) {
        let Some(bind_group) = &self.bind_group else {
            return;
        };
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Light Cull Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        // 64 threads per workgroup
        let workgroups = (cluster_count + 63) / 64;
        pass.dispatch_workgroups(workgroups, 1, 1);
    }
}
