//! # Scene Graph
//!
//! A tree of transform nodes with attached renderables and lights, plus
//! the traversal that flattens it into per-frame draw lists and the
//! frustum culling applied to those lists.

pub mod collect;
pub mod frustum;
pub mod node;

pub use collect::{collect_renderables, SceneCollection};
pub use frustum::{cull_by_camera_frustum, extract_planes, is_sphere_visible, FrustumPlane};
pub use node::{update, RenderPassKind, SceneNode};
