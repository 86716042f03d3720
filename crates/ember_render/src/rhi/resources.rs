//! GPU resource interfaces and handle types
//!
//! Resources are modeled as object-safe traits behind reference-counted
//! handles. Shared ownership is deliberate: the deferred pipeline aliases
//! the same depth and HDR color textures into two different framebuffers,
//! so a resource's lifetime is the union of all its holders rather than a
//! single owner.
//!
//! The core renders single-threaded (one thread records and submits each
//! frame), so handles use [`Rc`] rather than atomics.

use std::rc::Rc;

use super::types::{BufferKind, PixelFormat};

/// Shared handle to a GPU buffer
pub type BufferHandle = Rc<dyn GpuBuffer>;

/// Shared handle to a GPU texture
pub type TextureHandle = Rc<dyn GpuTexture>;

/// Shared handle to a framebuffer object
pub type FramebufferHandle = Rc<dyn Framebuffer>;

/// Shared handle to a compiled pipeline state object
pub type PipelineStateHandle = Rc<dyn PipelineState>;

/// A GPU buffer (vertex, index or uniform data)
pub trait GpuBuffer {
    /// Size of the buffer in bytes
    fn size(&self) -> u32;

    /// What this buffer holds
    fn kind(&self) -> BufferKind;
}

/// A 2D GPU texture, either sampled or used as a render target
pub trait GpuTexture {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Pixel format
    fn format(&self) -> PixelFormat;
}

/// A framebuffer object: a depth attachment plus zero or more color
/// attachments, enabling multiple-render-target output
pub trait Framebuffer {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// The depth attachment, if one was configured
    fn depth_attachment(&self) -> Option<TextureHandle>;

    /// A color attachment by index (e.g. 0 for albedo in the G-buffer)
    fn color_attachment(&self, index: usize) -> Option<TextureHandle>;
}

/// A compiled pipeline state object (vertex + fragment stage pair)
pub trait PipelineState {
    /// Human-readable label, for logs and diagnostics
    fn label(&self) -> &str;
}

/// Configuration for framebuffer creation
#[derive(Clone, Default)]
pub struct FramebufferDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Optional depth attachment; may be shared with another framebuffer
    pub depth_attachment: Option<TextureHandle>,
    /// Color attachments in draw-buffer order; may alias other framebuffers
    pub color_attachments: Vec<TextureHandle>,
}

/// Configuration for pipeline state creation
///
/// Shader sources are handed to the backend as-is; compilation happens
/// behind the [`Device`](super::Device) boundary and failures come back as
/// [`RenderError::ShaderCompilation`](crate::render::RenderError::ShaderCompilation).
#[derive(Clone)]
pub struct PipelineStateDesc<'a> {
    /// Label used in logs and compile diagnostics
    pub label: &'a str,
    /// Vertex stage source
    pub vertex_source: &'a str,
    /// Fragment stage source
    pub fragment_source: &'a str,
}
