//! # Render Hardware Interface
//!
//! Typed, backend-agnostic abstraction over GPU resources and command
//! recording. The rest of the crate is written entirely against the traits
//! in this module; a concrete graphics backend (OpenGL, Vulkan, ...) lives
//! outside the core and implements them.
//!
//! ## Design
//!
//! - **Shared-ownership handles**: resources are `Rc<dyn Trait>` because
//!   the deferred pipeline deliberately aliases textures between
//!   framebuffers. A resource lives as long as its longest holder.
//! - **Result-based creation**: every creation call returns
//!   [`RenderResult`](crate::render::RenderResult); failures are values,
//!   not panics, and callers degrade gracefully.
//! - **Bracketed recording**: commands are recorded between
//!   [`CommandBuffer::begin`] and [`CommandBuffer::end`] and submitted
//!   through the device once per frame.

pub mod command;
pub mod device;
pub mod null;
pub mod resources;
pub mod types;

pub use command::CommandBuffer;
pub use device::{Device, DeviceHandle};
pub use null::{NullDevice, RecordedCommand};
pub use resources::{
    BufferHandle, Framebuffer, FramebufferDesc, FramebufferHandle, GpuBuffer, GpuTexture,
    PipelineState, PipelineStateDesc, PipelineStateHandle, TextureHandle,
};
pub use types::{
    BlendFactor, BufferKind, BufferUsage, ClearFlags, CompareFunc, CullMode, PixelFormat,
    UniformValue,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_device_counts_resources() {
        let device = NullDevice::new();
        let tex = device
            .create_texture(4, 4, PixelFormat::Rgba8Unorm, None)
            .unwrap();
        device
            .create_framebuffer(&FramebufferDesc {
                width: 4,
                height: 4,
                depth_attachment: None,
                color_attachments: vec![tex],
            })
            .unwrap();
        assert_eq!(device.textures_created(), 1);
        assert_eq!(device.framebuffers_created(), 1);
        assert_eq!(device.buffers_created(), 0);
    }

    #[test]
    fn test_null_device_rejects_empty_framebuffer() {
        let device = NullDevice::new();
        let result = device.create_framebuffer(&FramebufferDesc::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_null_device_rejects_zero_area_texture() {
        let device = NullDevice::new();
        assert!(device
            .create_texture(0, 16, PixelFormat::Depth24, None)
            .is_err());
    }

    #[test]
    fn test_pipeline_failure_injection() {
        let device = NullDevice::new();
        device.fail_pipeline_creation("lighting");
        let desc = PipelineStateDesc {
            label: "deferred_lighting",
            vertex_source: "",
            fragment_source: "",
        };
        assert!(device.create_pipeline_state(&desc).is_err());

        let ok = PipelineStateDesc {
            label: "shadow_depth",
            vertex_source: "",
            fragment_source: "",
        };
        assert!(device.create_pipeline_state(&ok).is_ok());
    }

    #[test]
    fn test_command_journal_records_in_order() {
        let device = NullDevice::new();
        let mut cmd = device.create_command_buffer();
        cmd.begin();
        cmd.set_viewport(0, 0, 8, 8);
        cmd.clear(0.0, 0.0, 0.0, 1.0, ClearFlags::COLOR | ClearFlags::DEPTH);
        cmd.draw(3, 1);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        assert_eq!(journal.first(), Some(&RecordedCommand::Begin));
        assert_eq!(journal.last(), Some(&RecordedCommand::End));
        assert!(journal.contains(&RecordedCommand::Draw(3, 1)));
        assert_eq!(device.submits(), 1);
    }

    #[test]
    fn test_buffer_data_size_mismatch_is_error() {
        let device = NullDevice::new();
        let result = device.create_buffer(
            BufferKind::Vertex,
            BufferUsage::Static,
            16,
            Some(&[0u8; 12]),
        );
        assert!(result.is_err());
    }
}
