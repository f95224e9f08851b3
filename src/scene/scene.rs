//! Scene container - the root of the scene graph.

use super::Node;
use crate::core::Id;
use crate::math::{Matrix4, Quaternion};
use std::sync::{Arc, RwLock};

/// The scene - root container for all nodes.
pub struct Scene {
    /// The root node.
    root: Node,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        let mut root = Node::new();
        root.set_name("Scene");
        Self { root }
    }

    /// Get the scene ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.root.id()
    }

    /// Add a node to the scene.
    pub fn add(&mut self, node: Arc<RwLock<Node>>) {
        self.root.add(node);
    }

    /// Remove a node from the scene by ID.
    pub fn remove(&mut self, id: Id) -> Option<Arc<RwLock<Node>>> {
        self.root.remove_by_id(id)
    }

    /// Clear all nodes from the scene.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Get the top-level nodes.
    #[inline]
    pub fn children(&self) -> &[Arc<RwLock<Node>>] {
        self.root.children()
    }

    /// Get the number of top-level nodes.
    #[inline]
    pub fn children_count(&self) -> usize {
        self.root.children().len()
    }

    /// Update all world matrices in the scene.
    pub fn update_world_matrices(&mut self) {
        self.root
            .update_world(&Matrix4::IDENTITY, &Quaternion::IDENTITY);
    }

    /// Traverse all nodes in the scene.
    pub fn traverse<F>(&self, mut callback: F)
    where
        F: FnMut(&Node),
    {
        Self::traverse_recursive(&self.root, &mut callback);
    }

    fn traverse_recursive<F>(node: &Node, callback: &mut F)
    where
        F: FnMut(&Node),
    {
        callback(node);
        for child in node.children() {
            if let Ok(child_guard) = child.read() {
                Self::traverse_recursive(&child_guard, callback);
            }
        }
    }

    /// Traverse all visible nodes. An invisible node hides its whole subtree.
    pub fn traverse_visible<F>(&self, mut callback: F)
    where
        F: FnMut(&Node),
    {
        Self::traverse_visible_recursive(&self.root, &mut callback);
    }

    fn traverse_visible_recursive<F>(node: &Node, callback: &mut F)
    where
        F: FnMut(&Node),
    {
        if !node.visible {
            return;
        }
        callback(node);
        for child in node.children() {
            if let Ok(child_guard) = child.read() {
                Self::traverse_visible_recursive(&child_guard, callback);
            }
        }
    }

    /// Find a node by name.
    pub fn find_by_name(&self, name: &str) -> Option<Arc<RwLock<Node>>> {
        Self::find_by_name_recursive(self.root.children(), name)
    }

    fn find_by_name_recursive(
        children: &[Arc<RwLock<Node>>],
        name: &str,
    ) -> Option<Arc<RwLock<Node>>> {
        for child in children {
            if let Ok(child_guard) = child.read() {
                if child_guard.name() == name {
                    return Some(Arc::clone(child));
                }
                if let Some(found) = Self::find_by_name_recursive(child_guard.children(), name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Count nodes carrying a light component.
    pub fn count_lights(&self) -> usize {
        let mut count = 0;
        self.traverse(|node| {
            if node.light().is_some() {
                count += 1;
            }
        });
        count
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id())
            .field("children", &self.children_count())
            .field("lights", &self.count_lights())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{LightComponent, PointLight};
    use crate::math::Vector3;

    #[test]
    fn test_traverse_visible_skips_hidden_subtree() {
        let mut scene = Scene::new();

        let mut hidden = Node::with_light(PointLight::default());
        hidden.visible = false;
        let mut inner = Node::with_light(PointLight::default());
        inner.set_name("inner");
        hidden.add(inner.into_shared());
        scene.add(hidden.into_shared());

        let shown = Node::with_light(PointLight::default());
        scene.add(shown.into_shared());

        let mut seen = 0;
        scene.traverse_visible(|node| {
            if node.light().is_some() {
                seen += 1;
            }
        });
        assert_eq!(seen, 1);
        assert_eq!(scene.count_lights(), 3);
    }

    #[test]
    fn test_find_by_name() {
        let mut scene = Scene::new();
        let mut node = Node::new();
        node.set_name("key light");
        node.set_position(Vector3::new(1.0, 2.0, 3.0));
        scene.add(node.into_shared());

        let found = scene.find_by_name("key light").unwrap();
        assert_eq!(found.read().unwrap().name(), "key light");
        assert!(scene.find_by_name("missing").is_none());
    }

    #[test]
    fn test_update_world_matrices() {
        let mut scene = Scene::new();
        let mut node = Node::with_light(LightComponent::Point(PointLight::default()));
        node.set_position(Vector3::new(0.0, 3.0, 0.0));
        let node = node.into_shared();
        scene.add(Arc::clone(&node));

        scene.update_world_matrices();

        let guard = node.read().unwrap();
        assert!(guard
            .world_position()
            .approx_eq(&Vector3::new(0.0, 3.0, 0.0), 1e-6));
    }
}
