//! Hierarchical scene graph with lazy world-transform updates

use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::render::frame::{PointLight, Renderable};

/// Which stage of the pipeline draws a node's renderables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPassKind {
    /// Opaque geometry, written to the G-buffer
    #[default]
    Deferred,
    /// Transparent or special-shaded geometry, drawn after lighting
    Forward,
}

/// A node in the scene graph
///
/// Owns its children outright; the tree is updated by threading the parent
/// world matrix down through [`SceneNode::update_world_matrix`] rather
/// than through parent back-references. World matrices are recomputed only
/// along dirty paths.
pub struct SceneNode {
    /// Node name; not required to be unique
    pub name: String,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    local_matrix: Mat4,
    world_matrix: Mat4,
    dirty: bool,
    /// Invisible nodes prune their whole subtree from collection
    pub visible: bool,
    /// Stage that draws this node's renderables
    pub pass: RenderPassKind,
    /// Drawables attached to this node
    pub renderables: Vec<Renderable>,
    /// Optional light emitted from this node's world position
    pub point_light: Option<PointLight>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// Creates a node at the origin with identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            local_matrix: Mat4::identity(),
            world_matrix: Mat4::identity(),
            dirty: true,
            visible: true,
            pass: RenderPassKind::Deferred,
            renderables: Vec::new(),
            point_light: None,
            children: Vec::new(),
        }
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Cached world matrix, valid after the last tree update
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Whether this node's cached matrices are stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets the full local transform in one call
    pub fn set_local_transform(&mut self, position: Vec3, rotation: Quat, scale: Vec3) {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self.dirty = true;
    }

    /// Sets the local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    /// Sets the local rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Sets the local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Child nodes in attachment order
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Child nodes, mutable
    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    /// Attaches a child; its world transform becomes relative to this node
    /// from the next update on
    pub fn add_child(&mut self, mut child: SceneNode) {
        child.dirty = true;
        self.children.push(child);
    }

    /// Detaches and returns the child at `index`
    ///
    /// Reparenting is `take_child` followed by `add_child` on the new
    /// parent. Out-of-range indices return `None`.
    pub fn take_child(&mut self, index: usize) -> Option<SceneNode> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Detaches and returns the first direct child with the given name
    pub fn remove_child_named(&mut self, name: &str) -> Option<SceneNode> {
        let index = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(index))
    }

    /// Depth-first search for the first node named `name`, including self
    pub fn find_node(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_node(name))
    }

    /// Mutable variant of [`find_node`](Self::find_node)
    pub fn find_node_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_node_mut(name))
    }

    /// Recomputes world matrices along dirty paths
    ///
    /// A node recomputes when it is dirty or any ancestor on the path was;
    /// clean subtrees under clean parents are skipped entirely. Dirt
    /// propagates strictly downward.
    pub fn update_world_matrix(&mut self, parent_world: &Mat4, parent_dirty: bool) {
        let needs_update = self.dirty || parent_dirty;
        if needs_update {
            self.local_matrix = Mat4::new_translation(&self.position)
                * self.rotation.to_homogeneous()
                * Mat4::new_nonuniform_scaling(&self.scale);
            self.world_matrix = parent_world * self.local_matrix;
            self.dirty = false;
        }
        for child in &mut self.children {
            child.update_world_matrix(&self.world_matrix, needs_update);
        }
    }
}

/// Updates a whole tree from its root
pub fn update(root: &mut SceneNode) {
    root.update_world_matrix(&Mat4::identity(), false);
}
