//! Flattening the scene graph into per-frame draw lists

use crate::foundation::math::Mat4Ext;
use crate::render::frame::{PointLight, Renderable};
use crate::scene::node::{RenderPassKind, SceneNode};

/// Draw lists and lights gathered from one tree traversal
#[derive(Default)]
pub struct SceneCollection {
    /// Renderables routed to the G-buffer stage
    pub deferred: Vec<Renderable>,
    /// Renderables drawn after lighting
    pub forward: Vec<Renderable>,
    /// Point lights, positions already in world space
    pub point_lights: Vec<PointLight>,
}

/// Walks the tree depth-first and gathers everything drawable
///
/// Expects world matrices to be current (call [`update`](crate::scene::update)
/// first). Invisible nodes prune their entire subtree. Renderables are
/// cloned with the owning node's world matrix stamped in; lights get their
/// world position from the node's translation column.
pub fn collect_renderables(root: &SceneNode) -> SceneCollection {
    let mut collection = SceneCollection::default();
    visit(root, &mut collection);
    log::trace!(
        "scene collection: {} deferred, {} forward, {} lights",
        collection.deferred.len(),
        collection.forward.len(),
        collection.point_lights.len()
    );
    collection
}

fn visit(node: &SceneNode, out: &mut SceneCollection) {
    if !node.visible {
        return;
    }

    for renderable in &node.renderables {
        let mut renderable = renderable.clone();
        renderable.world_matrix = *node.world_matrix();
        match node.pass {
            RenderPassKind::Deferred => out.deferred.push(renderable),
            RenderPassKind::Forward => out.forward.push(renderable),
        }
    }

    if let Some(light) = node.point_light {
        let mut light = light;
        light.position = node.world_matrix().translation();
        out.point_lights.push(light);
    }

    for child in node.children() {
        visit(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::material::MaterialInstance;
    use crate::rhi::{BufferKind, BufferUsage, Device, NullDevice};
    use crate::scene::node::update;
    use approx::assert_relative_eq;

    fn test_renderable(device: &NullDevice) -> Renderable {
        let vb = device
            .create_buffer(BufferKind::Vertex, BufferUsage::Static, 64, None)
            .unwrap();
        let ib = device
            .create_buffer(BufferKind::Index, BufferUsage::Static, 24, None)
            .unwrap();
        Renderable::new(vb, ib, 6, MaterialInstance::new("test").into_handle())
    }

    #[test]
    fn test_collection_buckets_by_pass_kind() {
        let device = NullDevice::new();
        let mut root = SceneNode::new("root");

        let mut opaque = SceneNode::new("opaque");
        opaque.renderables.push(test_renderable(&device));

        let mut glass = SceneNode::new("glass");
        glass.pass = RenderPassKind::Forward;
        glass.renderables.push(test_renderable(&device));

        root.add_child(opaque);
        root.add_child(glass);
        update(&mut root);

        let collection = collect_renderables(&root);
        assert_eq!(collection.deferred.len(), 1);
        assert_eq!(collection.forward.len(), 1);
    }

    #[test]
    fn test_invisible_node_prunes_subtree() {
        let device = NullDevice::new();
        let mut root = SceneNode::new("root");
        let mut hidden = SceneNode::new("hidden");
        hidden.visible = false;
        let mut leaf = SceneNode::new("leaf");
        leaf.renderables.push(test_renderable(&device));
        leaf.point_light = Some(PointLight::default());
        hidden.add_child(leaf);
        root.add_child(hidden);
        update(&mut root);

        let collection = collect_renderables(&root);
        assert!(collection.deferred.is_empty());
        assert!(collection.point_lights.is_empty());
    }

    #[test]
    fn test_light_position_comes_from_world_matrix() {
        let mut root = SceneNode::new("root");
        root.set_position(Vec3::new(2.0, 0.0, 0.0));
        let mut lamp = SceneNode::new("lamp");
        lamp.set_position(Vec3::new(4.0, 0.0, 0.0));
        lamp.point_light = Some(PointLight {
            position: Vec3::new(-99.0, -99.0, -99.0),
            ..Default::default()
        });
        root.add_child(lamp);
        update(&mut root);

        let collection = collect_renderables(&root);
        assert_eq!(collection.point_lights.len(), 1);
        assert_relative_eq!(
            collection.point_lights[0].position,
            Vec3::new(6.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_world_matrix_is_stamped_on_renderables() {
        let device = NullDevice::new();
        let mut root = SceneNode::new("root");
        root.set_position(Vec3::new(0.0, 3.0, 0.0));
        root.renderables.push(test_renderable(&device));
        update(&mut root);

        let collection = collect_renderables(&root);
        assert_relative_eq!(
            collection.deferred[0].world_matrix.translation(),
            Vec3::new(0.0, 3.0, 0.0)
        );
    }
}
