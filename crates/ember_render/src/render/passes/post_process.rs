//! Tone mapping to the display surface

use std::any::Any;

use crate::render::frame::{FrameContext, Renderable};
use crate::render::graph::{RenderPass, RenderTargets};
use crate::render::material::uniform_location;
use crate::rhi::{
    CommandBuffer, CompareFunc, CullMode, Device, PipelineStateDesc, PipelineStateHandle,
    TextureHandle, UniformValue,
};

/// Resolves the HDR accumulation texture to the display with ACES tone
/// mapping and gamma correction
///
/// Drawn as a bufferless fullscreen triangle; this is the only stage that
/// touches the display surface and the only place HDR values are clamped.
pub struct PostProcessPass {
    hdr_color: TextureHandle,
    width: u32,
    height: u32,
    exposure: f32,
    pipeline: Option<PipelineStateHandle>,
}

impl PostProcessPass {
    /// Creates the pass reading the current HDR color target
    pub fn new(device: &dyn Device, targets: &RenderTargets, exposure: f32) -> Self {
        let pipeline = super::create_pipeline_or_disable(
            device,
            &PipelineStateDesc {
                label: "post_process",
                vertex_source: include_str!("../../../shaders/post_process.vert"),
                fragment_source: include_str!("../../../shaders/post_process.frag"),
            },
        );
        Self {
            hdr_color: targets.hdr_color.clone(),
            width: targets.width,
            height: targets.height,
            exposure,
            pipeline,
        }
    }

    /// Adjusts tone-mapping exposure for subsequent frames
    pub fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure;
    }
}

impl RenderPass for PostProcessPass {
    fn name(&self) -> &str {
        "post_process"
    }

    fn execute(
        &mut self,
        cmd: &mut dyn CommandBuffer,
        _context: &FrameContext,
        _renderables: &[Renderable],
    ) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };

        cmd.bind_framebuffer(None);
        cmd.set_viewport(0, 0, self.width, self.height);
        cmd.set_depth_test(false, false, CompareFunc::Always);
        cmd.set_blend_state(false);
        cmd.set_cull_mode(CullMode::None);
        cmd.set_pipeline_state(pipeline);
        cmd.bind_texture(0, &self.hdr_color);
        cmd.set_uniform(
            uniform_location("exposure"),
            UniformValue::Float(self.exposure),
        );
        cmd.draw(3, 1);
    }

    fn rebind_targets(&mut self, targets: &RenderTargets) {
        self.hdr_color = targets.hdr_color.clone();
        self.width = targets.width;
        self.height = targets.height;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene_renderer::create_render_targets;
    use crate::rhi::{NullDevice, RecordedCommand};

    #[test]
    fn test_post_process_draws_fullscreen_triangle_to_display() {
        let device = NullDevice::new();
        let targets = create_render_targets(&device, 800, 600).unwrap();
        let mut pass = PostProcessPass::new(&device, &targets, 1.25);

        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &FrameContext::default(), &[]);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        assert!(journal.contains(&RecordedCommand::BindFramebuffer(None)));
        assert!(journal.contains(&RecordedCommand::Draw(3, 1)));
        assert!(journal.contains(&RecordedCommand::SetUniform(
            uniform_location("exposure"),
            UniformValue::Float(1.25)
        )));
    }
}
