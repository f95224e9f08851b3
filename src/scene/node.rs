//! Scene graph node.

use crate::core::Id;
use crate::light::LightComponent;
use crate::math::{Matrix4, Quaternion, Vector3};
use std::sync::{Arc, RwLock};

/// A node in the scene graph.
///
/// Nodes carry a local transform and may hold a light component.
/// World transforms are accumulated top-down by
/// [`Scene::update_world_matrices`](super::Scene::update_world_matrices).
pub struct Node {
    /// Unique identifier.
    id: Id,
    /// Node name.
    name: String,
    /// Local position.
    pub position: Vector3,
    /// Local rotation.
    pub rotation: Quaternion,
    /// Local scale.
    pub scale: Vector3,
    /// Whether this node (and its subtree) is visible.
    pub visible: bool,
    /// Attached light, if any.
    light: Option<LightComponent>,
    /// World matrix (valid after update_world).
    world_matrix: Matrix4,
    /// Accumulated world rotation (valid after update_world).
    world_rotation: Quaternion,
    /// Child nodes.
    children: Vec<Arc<RwLock<Node>>>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Create a new empty node.
    pub fn new() -> Self {
        Self {
            id: Id::new(),
            name: String::new(),
            position: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vector3::ONE,
            visible: true,
            light: None,
            world_matrix: Matrix4::IDENTITY,
            world_rotation: Quaternion::IDENTITY,
            children: Vec::new(),
        }
    }

    /// Create a node carrying a light component.
    pub fn with_light(light: impl Into<LightComponent>) -> Self {
        let mut node = Self::new();
        node.light = Some(light.into());
        node
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the node name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the node name.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set the local position.
    #[inline]
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    /// Set the local rotation.
    #[inline]
    pub fn set_rotation(&mut self, rotation: Quaternion) {
        self.rotation = rotation;
    }

    /// Get the attached light.
    #[inline]
    pub fn light(&self) -> Option<&LightComponent> {
        self.light.as_ref()
    }

    /// Attach or replace the light component.
    #[inline]
    pub fn set_light(&mut self, light: Option<LightComponent>) {
        self.light = light;
    }

    /// Get the world matrix (valid after the scene's world update).
    #[inline]
    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world_matrix
    }

    /// Get the world position (valid after the scene's world update).
    #[inline]
    pub fn world_position(&self) -> Vector3 {
        self.world_matrix.get_position()
    }

    /// Get the world rotation (valid after the scene's world update).
    #[inline]
    pub fn world_rotation(&self) -> &Quaternion {
        &self.world_rotation
    }

    /// Get the children.
    #[inline]
    pub fn children(&self) -> &[Arc<RwLock<Node>>] {
        &self.children
    }

    /// Add a child node.
    pub fn add(&mut self, child: Arc<RwLock<Node>>) {
        self.children.push(child);
    }

    /// Remove a child by ID.
    pub fn remove_by_id(&mut self, id: Id) -> Option<Arc<RwLock<Node>>> {
        let pos = self
            .children
            .iter()
            .position(|c| c.read().map(|guard| guard.id() == id).unwrap_or(false))?;
        Some(self.children.remove(pos))
    }

    /// Clear all children.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Update this node's world transform and recurse into children.
    pub fn update_world(&mut self, parent_matrix: &Matrix4, parent_rotation: &Quaternion) {
        let local = Matrix4::compose(&self.position, &self.rotation, &self.scale);
        self.world_matrix = parent_matrix.multiply(&local);
        self.world_rotation = parent_rotation.multiply(&self.rotation);

        for child in &self.children {
            if let Ok(mut child_guard) = child.write() {
                child_guard.update_world(&self.world_matrix, &self.world_rotation);
            }
        }
    }

    /// Wrap the node for insertion into a scene.
    pub fn into_shared(self) -> Arc<RwLock<Node>> {
        Arc::new(RwLock::new(self))
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("has_light", &self.light.is_some())
            .field("children", &self.children.len())
            .finish()
    }
}
