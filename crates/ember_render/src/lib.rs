//! # Ember Render
//!
//! A deferred + forward hybrid rendering pipeline core, written against a
//! backend-agnostic render hardware interface.
//!
//! ## Features
//!
//! - **Deferred Shading**: G-buffer fill plus additive per-light volumes
//! - **Forward Stage**: transparent and special-shaded geometry over the
//!   shared depth buffer
//! - **Shadow Mapping**: directional shadow map sampled by both lit stages
//! - **Scene Graph**: lazy hierarchical transforms with visibility pruning
//! - **Frustum Culling**: bounding-sphere tests for renderables and lights
//! - **HDR Post-Processing**: ACES tone mapping to the display surface
//!
//! ## Quick Start
//!
//! ```rust
//! use ember_render::prelude::*;
//! use ember_render::rhi::NullDevice;
//!
//! fn main() -> Result<(), RenderError> {
//!     let device = NullDevice::new_handle();
//!     let mut renderer = SceneRenderer::new(device, RendererSettings::default());
//!     renderer.init(1280, 720)?;
//!
//!     let mut root = SceneNode::new("root");
//!     update(&mut root);
//!     let collection = collect_renderables(&root);
//!
//!     let context = FrameContext::default();
//!     renderer.render(&context, &collection.deferred, &collection.forward)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod rhi;
pub mod scene;

pub use render::{RenderError, RenderResult};

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        config::{Config, RendererSettings},
        foundation::math::{Mat4, Mat4Ext, Quat, Vec3, Vec4},
        render::{
            FrameContext, Material, MaterialHandle, MaterialInstance, MaterialValue, PointLight,
            RenderError, RenderResult, Renderable, SceneRenderer, Vertex,
        },
        scene::{collect_renderables, update, RenderPassKind, SceneNode},
    };
}
