//! Graphics device abstraction
//!
//! The [`Device`] trait is the single entry point through which the core
//! obtains GPU resources and command buffers. A concrete backend (OpenGL,
//! Vulkan, a software rasterizer) implements this trait; the core contains
//! no API-specific calls and is written entirely against it.
//!
//! All creation functions return [`RenderResult`]: a failed shader compile
//! or an unsupported format is an `Err` the caller must check, never a
//! panic. Passes that fail to obtain a pipeline state self-disable for the
//! session rather than retrying (see the pass implementations in
//! [`crate::render::passes`]).

use std::rc::Rc;

use super::command::CommandBuffer;
use super::resources::{
    BufferHandle, FramebufferDesc, FramebufferHandle, PipelineStateDesc, PipelineStateHandle,
    TextureHandle,
};
use super::types::{BufferKind, BufferUsage, PixelFormat};
use crate::render::RenderResult;

/// Shared handle to a graphics device
pub type DeviceHandle = Rc<dyn Device>;

/// Creates GPU resources and command buffers
pub trait Device {
    /// Create a buffer, optionally uploading initial contents
    ///
    /// When `data` is provided its length must equal `size`.
    fn create_buffer(
        &self,
        kind: BufferKind,
        usage: BufferUsage,
        size: u32,
        data: Option<&[u8]>,
    ) -> RenderResult<BufferHandle>;

    /// Create a 2D texture, optionally uploading initial contents
    fn create_texture(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Option<&[u8]>,
    ) -> RenderResult<TextureHandle>;

    /// Create a framebuffer from attachment textures
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> RenderResult<FramebufferHandle>;

    /// Compile and link a pipeline state object
    ///
    /// A compile or link failure returns
    /// [`RenderError::ShaderCompilation`](crate::render::RenderError::ShaderCompilation)
    /// carrying the backend diagnostic.
    fn create_pipeline_state(&self, desc: &PipelineStateDesc<'_>)
        -> RenderResult<PipelineStateHandle>;

    /// Create a command buffer for recording
    fn create_command_buffer(&self) -> Box<dyn CommandBuffer>;

    /// Submit a recorded command buffer for execution
    fn submit(&self, cmd: &mut dyn CommandBuffer);
}
