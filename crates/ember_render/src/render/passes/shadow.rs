//! Shadow map generation

use std::any::Any;

use crate::render::frame::{FrameContext, Renderable};
use crate::render::graph::RenderPass;
use crate::render::material::uniform_location;
use crate::render::RenderResult;
use crate::rhi::{
    ClearFlags, CommandBuffer, Device, FramebufferDesc, FramebufferHandle, PipelineStateDesc,
    PipelineStateHandle, PixelFormat, TextureHandle, UniformValue,
};

/// Slope-scaled depth bias applied while rendering casters
///
/// Matched to the shadow map resolution by eye; reset to zero before the
/// pass ends so later passes are unaffected.
const DEPTH_BIAS_CONSTANT: f32 = 1.1;
const DEPTH_BIAS_SLOPE: f32 = 4.0;

/// Renders the deferred casters into a fixed-resolution depth map from
/// the sun's point of view
pub struct ShadowPass {
    framebuffer: FramebufferHandle,
    depth_map: TextureHandle,
    size: u32,
    pipeline: Option<PipelineStateHandle>,
}

impl ShadowPass {
    /// Creates the depth target and the caster pipeline
    pub fn new(device: &dyn Device, size: u32) -> RenderResult<Self> {
        let depth_map = device.create_texture(size, size, PixelFormat::Depth24, None)?;
        let framebuffer = device.create_framebuffer(&FramebufferDesc {
            width: size,
            height: size,
            depth_attachment: Some(depth_map.clone()),
            color_attachments: Vec::new(),
        })?;
        let pipeline = super::create_pipeline_or_disable(
            device,
            &PipelineStateDesc {
                label: "shadow_depth",
                vertex_source: include_str!("../../../shaders/shadow_depth.vert"),
                fragment_source: include_str!("../../../shaders/shadow_depth.frag"),
            },
        );
        Ok(Self {
            framebuffer,
            depth_map,
            size,
            pipeline,
        })
    }

    /// The rendered shadow map, sampled by the lighting and forward stages
    pub fn depth_map(&self) -> &TextureHandle {
        &self.depth_map
    }
}

impl RenderPass for ShadowPass {
    fn name(&self) -> &str {
        "shadow"
    }

    fn execute(
        &mut self,
        cmd: &mut dyn CommandBuffer,
        context: &FrameContext,
        renderables: &[Renderable],
    ) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };

        cmd.bind_framebuffer(Some(&self.framebuffer));
        cmd.set_viewport(0, 0, self.size, self.size);
        cmd.set_draw_buffers(&[]);
        cmd.clear(0.0, 0.0, 0.0, 0.0, ClearFlags::DEPTH);
        cmd.set_depth_bias(DEPTH_BIAS_CONSTANT, DEPTH_BIAS_SLOPE);
        cmd.set_pipeline_state(pipeline);
        cmd.set_uniform(
            uniform_location("lightSpaceMatrix"),
            UniformValue::Mat4(context.light_space_matrix),
        );

        for renderable in renderables {
            cmd.set_uniform(
                uniform_location("model"),
                UniformValue::Mat4(renderable.world_matrix),
            );
            cmd.bind_vertex_buffer(&renderable.vertex_buffer);
            cmd.bind_index_buffer(&renderable.index_buffer);
            cmd.draw_indexed(renderable.index_count, 1);
        }

        cmd.set_depth_bias(0.0, 0.0);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::{NullDevice, RecordedCommand};

    #[test]
    fn test_shadow_pass_clears_depth_only() {
        let device = NullDevice::new();
        let mut pass = ShadowPass::new(&device, 1024).unwrap();
        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &FrameContext::default(), &[]);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        assert!(journal.contains(&RecordedCommand::Clear {
            color: [0.0, 0.0, 0.0, 0.0],
            flags: ClearFlags::DEPTH,
        }));
        assert!(journal.contains(&RecordedCommand::SetDrawBuffers(Vec::new())));
        assert!(journal.contains(&RecordedCommand::SetViewport(0, 0, 1024, 1024)));
    }

    #[test]
    fn test_depth_bias_is_reset_after_pass() {
        let device = NullDevice::new();
        let mut pass = ShadowPass::new(&device, 2048).unwrap();
        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &FrameContext::default(), &[]);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        let biases: Vec<_> = journal
            .iter()
            .filter(|c| matches!(c, RecordedCommand::SetDepthBias(..)))
            .collect();
        assert_eq!(
            biases,
            vec![
                &RecordedCommand::SetDepthBias(DEPTH_BIAS_CONSTANT, DEPTH_BIAS_SLOPE),
                &RecordedCommand::SetDepthBias(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_disabled_pass_records_nothing() {
        let device = NullDevice::new();
        device.fail_pipeline_creation("shadow");
        let mut pass = ShadowPass::new(&device, 2048).unwrap();
        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &FrameContext::default(), &[]);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        assert_eq!(journal, vec![RecordedCommand::Begin, RecordedCommand::End]);
    }
}
