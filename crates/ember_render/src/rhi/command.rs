//! Command recording interface
//!
//! A [`CommandBuffer`] records render state changes, resource bindings and
//! draw calls between a `begin`/`end` bracket. Recording is strictly
//! sequential and single-threaded; the backend decides whether commands are
//! executed immediately (GL-style) or deferred until submission.
//!
//! No resource creation is possible mid-recording: the [`Device`] is not
//! reachable from a command buffer, which enforces the invariant by
//! construction.
//!
//! [`Device`]: super::Device

use super::resources::{BufferHandle, FramebufferHandle, PipelineStateHandle, TextureHandle};
use super::types::{BlendFactor, ClearFlags, CompareFunc, CullMode, PixelFormat, UniformValue};

/// Records rendering commands for one frame
pub trait CommandBuffer {
    /// Start command recording
    fn begin(&mut self);

    /// End command recording
    fn end(&mut self);

    /// Bind a framebuffer as the render target; `None` selects the
    /// display surface
    fn bind_framebuffer(&mut self, framebuffer: Option<&FramebufferHandle>);

    /// Set the viewport rectangle in pixels
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Clear the bound render target
    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32, flags: ClearFlags);

    /// Select which color attachments subsequent draws write into (MRT).
    /// An empty slice disables color output entirely, as the shadow pass
    /// does for its depth-only target.
    fn set_draw_buffers(&mut self, formats: &[PixelFormat]);

    /// Set depth bias (polygon offset). Used by shadow mapping to prevent
    /// self-shadowing acne; reset to (0, 0) when done.
    fn set_depth_bias(&mut self, constant: f32, slope: f32);

    /// Enable or disable blending
    fn set_blend_state(&mut self, enabled: bool);

    /// Configure the blend function combining source and destination
    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    /// Configure depth testing and depth writes
    fn set_depth_test(&mut self, enabled: bool, write_enabled: bool, func: CompareFunc);

    /// Set the face culling mode
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Bind a pipeline state object
    fn set_pipeline_state(&mut self, pso: &PipelineStateHandle);

    /// Bind a vertex buffer
    fn bind_vertex_buffer(&mut self, buffer: &BufferHandle);

    /// Bind an index buffer
    fn bind_index_buffer(&mut self, buffer: &BufferHandle);

    /// Bind a texture to a sampler slot
    fn bind_texture(&mut self, slot: u32, texture: &TextureHandle);

    /// Upload a uniform value to a numbered location
    fn set_uniform(&mut self, location: u32, value: UniformValue);

    /// Draw non-indexed geometry
    fn draw(&mut self, vertex_count: u32, instance_count: u32);

    /// Draw indexed geometry
    fn draw_indexed(&mut self, index_count: u32, instance_count: u32);
}
