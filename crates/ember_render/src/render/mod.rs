//! # High-Level Rendering
//!
//! The deferred + forward hybrid pipeline. [`SceneRenderer`] owns the
//! render targets and the fixed pass sequence; individual passes live in
//! [`passes`] and are orchestrated through the [`graph`] module.
//!
//! Everything here is written against the [`rhi`](crate::rhi) traits and
//! never talks to a concrete graphics API.

pub mod frame;
pub mod geometry;
pub mod graph;
pub mod material;
pub mod passes;
pub mod scene_renderer;

pub use frame::{FrameContext, PointLight, Renderable, Vertex};
pub use graph::{RenderGraph, RenderPass, RenderTargets};
pub use material::{Material, MaterialHandle, MaterialInstance, MaterialValue};
pub use scene_renderer::{create_render_targets, SceneRenderer};

use thiserror::Error;

/// Errors surfaced by renderer initialization and per-frame execution
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer or pass setup failed
    #[error("renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A frame could not be rendered
    #[error("rendering failed: {0}")]
    RenderingFailed(String),

    /// A GPU resource could not be created
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Shader compilation or pipeline linking failed
    #[error("shader compilation failed for '{label}': {log}")]
    ShaderCompilation {
        /// Pipeline label that failed to build
        label: String,
        /// Compiler or linker output
        log: String,
    },

    /// The backend reported an error outside the categories above
    #[error("backend error: {0}")]
    BackendError(String),
}

/// Convenience alias used throughout the renderer
pub type RenderResult<T> = Result<T, RenderError>;
