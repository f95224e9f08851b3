//! Per-frame light collection.

use crate::light::GpuLight;
use crate::scene::Scene;

/// Flattens the scene's visible lights into a `GpuLight` array.
///
/// The array is rebuilt every frame and reused across frames to avoid
/// reallocation. Collection order follows scene traversal order; it is
/// deterministic for a fixed scene but nothing downstream depends on it.
pub struct LightCollector {
    max_lights: u32,
    lights: Vec<GpuLight>,
    dropped: u32,
    overflow_logged: bool,
}

impl LightCollector {
    /// Create a collector with a fixed light capacity.
    pub fn new(max_lights: u32) -> Self {
        Self {
            max_lights,
            lights: Vec::with_capacity(max_lights as usize),
            dropped: 0,
            overflow_logged: false,
        }
    }

    /// Snapshot all visible lights in the scene.
    ///
    /// Refreshes the scene's world matrices first so light positions
    /// and spot directions reflect the current transforms. Lights past
    /// capacity are dropped and counted; the overflow is logged once
    /// per episode, not per frame.
    pub fn collect(&mut self, scene: &mut Scene) -> &[GpuLight] {
        scene.update_world_matrices();

        self.lights.clear();
        self.dropped = 0;

        let max = self.max_lights as usize;
        let lights = &mut self.lights;
        let dropped = &mut self.dropped;
        scene.traverse_visible(|node| {
            if let Some(light) = node.light() {
                if lights.len() < max {
                    lights.push(light.to_gpu_light(node.world_position(), node.world_rotation()));
                } else {
                    *dropped += 1;
                }
            }
        });

        if self.dropped > 0 {
            if !self.overflow_logged {
                log::warn!(
                    "Light capacity exceeded: {} lights dropped (max {})",
                    self.dropped,
                    self.max_lights
                );
                self.overflow_logged = true;
            }
        } else {
            self.overflow_logged = false;
        }

        &self.lights
    }

    /// Lights gathered by the last [`collect`](Self::collect).
    #[inline]
    pub fn lights(&self) -> &[GpuLight] {
        &self.lights
    }

    /// Lights dropped by the last collection due to capacity.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
