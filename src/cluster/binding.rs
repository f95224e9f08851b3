//! Read-only cluster bindings for shading passes.
//!
//! Shading never re-runs any culling logic; it binds the buffers the
//! culling pass wrote and looks its cluster up with `cluster_of_pixel`
//! from the shared WGSL chunk.

use super::culling::LightCullingPass;
use super::resources::ClusterResources;

/// The canonical cluster structs and index functions, shared between
/// the culling kernel and every shading shader. There is exactly one
/// copy of the slice mapping per language: this chunk for WGSL and
/// [`cluster::index`](super::index) for Rust.
pub const CLUSTER_COMMON_WGSL: &str = include_str!("../shaders/cluster_common.wgsl");

/// Prepend the shared cluster chunk to a shader body.
pub fn compose_cluster_shader(body: &str) -> String {
    format!("{CLUSTER_COMMON_WGSL}\n{body}")
}

/// Read-only bind group over the culling output for shading passes:
/// {params uniform, ranges, compacted indices, lights}.
pub struct ClusterBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
}

impl ClusterBindings {
    /// Create the layout. The bind group itself is built by
    /// [`update`](Self::update) once buffers exist.
    pub fn new(device: &wgpu::Device) -> Self {
        let read_storage = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT | wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cluster Shading Bind Group Layout"),
            entries: &[
                // Params uniform (grid dims + slice mapping terms)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT | wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Per-cluster ranges
                read_storage(1),
                // Compacted light indices
                read_storage(2),
                // Light array
                read_storage(3),
            ],
        });

        Self {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Rebuild the bind group over the current buffers. Call after
    /// creation and again whenever the grid buffers are reallocated.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        resources: &ClusterResources,
        culling: &LightCullingPass,
    ) {
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cluster Shading Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: culling.params_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: resources.range_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: resources.index_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: resources.light_buffer.as_entire_binding(),
                },
            ],
        }));
    }

    /// Layout for shading pipeline creation.
    #[inline]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Bind group for shading pass encoding. `None` until the first
    /// [`update`](Self::update).
    #[inline]
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_shader_contains_both_chunks() {
        let composed = compose_cluster_shader("fn body_marker() {}");
        assert!(composed.contains("fn cluster_of_pixel"));
        assert!(composed.contains("fn body_marker"));
        // The chunk defines the structs shading shaders reference
        assert!(composed.contains("struct ClusterParams"));
        assert!(composed.contains("struct LightRange"));
    }
}
