//! # Core Module
//!
//! Core functionality: wgpu context management, per-frame camera
//! snapshots, and object identity.

mod context;
mod frame;
mod id;

pub use context::{Context, ContextError};
pub use frame::FrameContext;
pub use id::Id;

/// Context configuration options.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Allow falling back to a software adapter.
    pub force_fallback_adapter: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
        }
    }
}
