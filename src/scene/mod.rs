//! # Scene Module
//!
//! Scene graph with hierarchical transformations. Nodes carry optional
//! light components that the culling pipeline collects each frame.

mod node;
mod scene;

pub use node::Node;
pub use scene::Scene;
