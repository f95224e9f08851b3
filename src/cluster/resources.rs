//! GPU buffer management for clustered light culling.

use super::grid::ClusterBounds;
use super::index::ClusterDims;
use super::ClusterConfig;
use crate::light::GpuLight;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Per-cluster range into the compacted index list (8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Default)]
#[repr(C)]
pub struct ClusterLightRange {
    /// First entry in the compacted index list.
    pub offset: u32,
    /// Number of entries.
    pub count: u32,
}

/// Global allocation cursor for the compacted list (16 bytes).
/// Padded so the buffer also works as a uniform if ever needed.
#[derive(Debug, Clone, Copy, Pod, Zeroable, Default)]
#[repr(C)]
pub struct GlobalCounter {
    /// Next free slot in the compacted index list.
    pub value: u32,
    /// Padding.
    pub _pad: [u32; 3],
}

/// GPU buffers for the clustered lighting pipeline.
///
/// The bounds/range buffers are sized for a specific grid; `resize`
/// reallocates them when the grid changes. The light and index buffers
/// are sized once from the configuration.
pub struct ClusterResources {
    /// Per-cluster view-space AABBs (read by the culling kernel).
    pub bounds_buffer: wgpu::Buffer,
    /// Per-cluster {offset, count} ranges (written by the kernel).
    pub range_buffer: wgpu::Buffer,
    /// Compacted light index list (written by the kernel).
    pub index_buffer: wgpu::Buffer,
    /// Global atomic allocation cursor.
    pub counter_buffer: wgpu::Buffer,
    /// Collected `GpuLight` array, uploaded each frame.
    pub light_buffer: wgpu::Buffer,

    /// Grid the bounds/range buffers are sized for.
    dims: ClusterDims,
    /// Capacity of the compacted index list.
    max_indices: u32,
    /// Capacity of the light array.
    max_lights: u32,
    /// Set once a bounds upload was refused, to avoid per-frame spam.
    upload_guard_logged: bool,
}

impl ClusterResources {
    /// Allocate buffers for the given configuration and grid.
    pub fn new(device: &wgpu::Device, config: &ClusterConfig, dims: ClusterDims) -> Self {
        let (bounds_buffer, range_buffer) = Self::grid_buffers(device, dims);

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Light Index Buffer"),
            size: (config.max_indices as usize * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let counter_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cluster Counter Buffer"),
            contents: bytemuck::cast_slice(&[GlobalCounter::default()]),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Light Buffer"),
            size: (config.max_lights as usize * std::mem::size_of::<GpuLight>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            bounds_buffer,
            range_buffer,
            index_buffer,
            counter_buffer,
            light_buffer,
            dims,
            max_indices: config.max_indices,
            max_lights: config.max_lights,
            upload_guard_logged: false,
        }
    }

    fn grid_buffers(device: &wgpu::Device, dims: ClusterDims) -> (wgpu::Buffer, wgpu::Buffer) {
        // A zero-sized grid still gets one-element buffers so bind
        // groups stay valid before the first real resize.
        let clusters = dims.cluster_count().max(1) as usize;

        let bounds_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Bounds Buffer"),
            size: (clusters * std::mem::size_of::<ClusterBounds>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let range_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Light Range Buffer"),
            size: (clusters * std::mem::size_of::<ClusterLightRange>()) as u64,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        (bounds_buffer, range_buffer)
    }

    /// Grid the buffers are currently sized for.
    #[inline]
    pub fn dims(&self) -> ClusterDims {
        self.dims
    }

    /// Capacity of the compacted index list.
    #[inline]
    pub fn max_indices(&self) -> u32 {
        self.max_indices
    }

    /// Reallocate the grid-sized buffers for new dimensions.
    /// Callers must recreate any bind group referencing them.
    pub fn resize(&mut self, device: &wgpu::Device, dims: ClusterDims) {
        if dims == self.dims {
            return;
        }
        let (bounds, ranges) = Self::grid_buffers(device, dims);
        self.bounds_buffer = bounds;
        self.range_buffer = ranges;
        self.dims = dims;
        self.upload_guard_logged = false;
        log::debug!("Cluster buffers resized for {} clusters", dims.cluster_count());
    }

    /// Upload cluster AABBs. Refused with a warning (once per size
    /// mismatch episode) if the buffers are sized for a different grid.
    pub fn upload_bounds(&mut self, queue: &wgpu::Queue, bounds: &[ClusterBounds]) {
        if bounds.len() as u32 != self.dims.cluster_count() {
            if !self.upload_guard_logged {
                log::warn!(
                    "Cluster bounds upload skipped: {} AABBs but buffers hold {}",
                    bounds.len(),
                    self.dims.cluster_count()
                );
                self.upload_guard_logged = true;
            }
            return;
        }
        self.upload_guard_logged = false;
        queue.write_buffer(&self.bounds_buffer, 0, bytemuck::cast_slice(bounds));
    }

    /// Upload the collected lights, clamped to the buffer capacity.
    /// Returns the number of lights actually uploaded.
    pub fn upload_lights(&self, queue: &wgpu::Queue, lights: &[GpuLight]) -> u32 {
        let count = lights.len().min(self.max_lights as usize);
        if count > 0 {
            queue.write_buffer(
                &self.light_buffer,
                0,
                bytemuck::cast_slice(&lights[..count]),
            );
        }
        count as u32
    }

    /// Reset the allocation cursor to zero. Must run before every
    /// culling pass; a stale counter corrupts the next frame's ranges.
    pub fn reset_counter(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.counter_buffer,
            0,
            bytemuck::cast_slice(&[GlobalCounter::default()]),
        );
    }

    /// Clear every per-cluster range to {0, 0}.
    /// Used instead of a dispatch when no lights were collected.
    pub fn clear_ranges(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.range_buffer, 0, None);
    }
}
