//! # Candela - Clustered Forward+ Light Culling
//!
//! Candela is the clustered lighting subsystem of a wgpu renderer. It divides
//! the camera frustum into a 3D grid of clusters (screen tiles crossed with
//! exponential depth slices), gathers the scene's point and spot lights each
//! frame, and assigns every light to the clusters its influence sphere
//! touches, producing compacted per-cluster light lists that shading passes
//! consume.
//!
//! ## Features
//!
//! - **Math**: 3D math library (vectors, matrices, quaternions, bounds)
//! - **Core**: headless wgpu context, per-frame camera snapshots
//! - **Scene**: lightweight scene graph with light components
//! - **Cluster**: grid construction, light collection, GPU culling with
//!   atomic compaction, and a parallel CPU reference culler
//!
//! ## Example
//!
//! ```ignore
//! use candela::prelude::*;
//!
//! let context = Context::headless(&ContextConfig::default()).await?;
//! let mut camera = PerspectiveCamera::new(60.0, 16.0 / 9.0, 0.1, 300.0);
//! let mut scene = Scene::new();
//!
//! let mut lamp = Node::with_light(PointLight::new(Color::WHITE, 3.0, 12.0));
//! lamp.set_position(Vector3::new(0.0, 4.0, 0.0));
//! scene.add(lamp.into_shared());
//!
//! let mut lights = ClusteredLights::new(&context.device, ClusterConfig::default());
//! let frame = FrameContext::from_camera(&mut camera, 1280, 720);
//! lights.prepare(&context.device, &context.queue, &mut scene, &frame);
//!
//! let mut encoder = context.create_command_encoder();
//! lights.encode(&mut encoder);
//! context.queue.submit([encoder.finish()]);
//! ```

#![warn(missing_docs)]

pub mod math;
pub mod core;
pub mod scene;
pub mod camera;
pub mod light;
pub mod cluster;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::math::*;
    pub use crate::core::*;
    pub use crate::scene::*;
    pub use crate::camera::*;
    pub use crate::light::*;
    pub use crate::cluster::*;
}

/// Engine version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const NAME: &str = "Candela";
