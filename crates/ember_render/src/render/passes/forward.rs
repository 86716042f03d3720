//! Forward stage for geometry the G-buffer cannot represent

use std::any::Any;

use crate::render::frame::{FrameContext, Renderable};
use crate::render::graph::{RenderPass, RenderTargets};
use crate::render::material::MaterialValue;
use crate::rhi::{
    CommandBuffer, CompareFunc, CullMode, Device, FramebufferHandle, PipelineStateDesc,
    PipelineStateHandle, TextureHandle,
};
use crate::scene::frustum::cull_by_camera_frustum;

/// Draws forward-shaded renderables into the HDR target
///
/// Runs against the G-buffer depth so forward geometry occludes and is
/// occluded by deferred geometry. The target is never cleared here; the
/// lighting output is already in it.
pub struct ForwardPass {
    framebuffer: FramebufferHandle,
    shadow_map: TextureHandle,
    width: u32,
    height: u32,
    pipeline: Option<PipelineStateHandle>,
}

impl ForwardPass {
    /// Creates the pass against the current targets and shadow map
    pub fn new(device: &dyn Device, targets: &RenderTargets, shadow_map: TextureHandle) -> Self {
        let pipeline = super::create_pipeline_or_disable(
            device,
            &PipelineStateDesc {
                label: "forward_lit",
                vertex_source: include_str!("../../../shaders/forward_lit.vert"),
                fragment_source: include_str!("../../../shaders/forward_lit.frag"),
            },
        );
        Self {
            framebuffer: targets.forward.clone(),
            shadow_map,
            width: targets.width,
            height: targets.height,
            pipeline,
        }
    }
}

impl RenderPass for ForwardPass {
    fn name(&self) -> &str {
        "forward"
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

        let visible = cull_by_camera_frustum(context, renderables);
        if visible.is_empty() {
            return;
        }

        cmd.bind_framebuffer(Some(&self.framebuffer));
        cmd.set_viewport(0, 0, self.width, self.height);
        cmd.set_depth_test(true, true, CompareFunc::LessEqual);
        cmd.set_cull_mode(CullMode::Back);
        cmd.set_pipeline_state(pipeline);
        cmd.bind_texture(3, &self.shadow_map);

        for renderable in &visible {
            let mut material = renderable.material.borrow_mut();
            material.set_parameter("model", MaterialValue::Mat4(renderable.world_matrix));
            material.set_parameter("view", MaterialValue::Mat4(context.view_matrix));
            material.set_parameter(
                "projection",
                MaterialValue::Mat4(context.projection_matrix),
            );
            material.set_parameter(
                "lightSpaceMatrix",
                MaterialValue::Mat4(context.light_space_matrix),
            );
            material.set_parameter(
                "lightPosition",
                MaterialValue::Vec3(context.sun_position),
            );
            material.set_parameter("lightColor", MaterialValue::Vec3(context.sun_color));
            material.set_parameter("camPos", MaterialValue::Vec3(context.camera_position));
            material.bind(cmd);
            cmd.bind_vertex_buffer(&renderable.vertex_buffer);
            cmd.bind_index_buffer(&renderable.index_buffer);
            cmd.draw_indexed(renderable.index_count, 1);
        }
    }

    fn rebind_targets(&mut self, targets: &RenderTargets) {
        self.framebuffer = targets.forward.clone();
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
    use crate::foundation::math::{deg_to_rad, Mat4, Mat4Ext, Vec3};
    use crate::render::material::MaterialInstance;
    use crate::render::scene_renderer::create_render_targets;
    use crate::rhi::{BufferKind, BufferUsage, NullDevice, PixelFormat, RecordedCommand};

    fn test_pass(device: &NullDevice) -> ForwardPass {
        let targets = create_render_targets(device, 640, 480).unwrap();
        let shadow_map = device
            .create_texture(2048, 2048, PixelFormat::Depth24, None)
            .unwrap();
        ForwardPass::new(device, &targets, shadow_map)
    }

    fn renderable_at(device: &NullDevice, position: Vec3) -> Renderable {
        let vb = device
            .create_buffer(BufferKind::Vertex, BufferUsage::Static, 64, None)
            .unwrap();
        let ib = device
            .create_buffer(BufferKind::Index, BufferUsage::Static, 24, None)
            .unwrap();
        let mut r = Renderable::new(vb, ib, 6, MaterialInstance::new("glass").into_handle());
        r.world_matrix = Mat4::new_translation(&position);
        r
    }

    fn camera_context() -> FrameContext {
        FrameContext {
            view_matrix: Mat4::look_at(
                Vec3::zeros(),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(0.0, 1.0, 0.0),
            ),
            projection_matrix: Mat4::perspective(deg_to_rad(60.0), 1.0, 0.1, 100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_forward_pass_never_clears() {
        let device = NullDevice::new();
        let mut pass = test_pass(&device);
        let list = vec![renderable_at(&device, Vec3::new(0.0, 0.0, -5.0))];

        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &camera_context(), &list);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        assert!(!journal
            .iter()
            .any(|c| matches!(c, RecordedCommand::Clear { .. })));
        assert!(journal.contains(&RecordedCommand::DrawIndexed(6, 1)));
    }

    #[test]
    fn test_forward_pass_culls_offscreen_renderables() {
        let device = NullDevice::new();
        let mut pass = test_pass(&device);
        let list = vec![
            renderable_at(&device, Vec3::new(0.0, 0.0, -5.0)),
            renderable_at(&device, Vec3::new(300.0, 0.0, -5.0)),
        ];

        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &camera_context(), &list);
        cmd.end();
        device.submit(cmd.as_mut());

        let draws = device
            .take_journal()
            .iter()
            .filter(|c| matches!(c, RecordedCommand::DrawIndexed(..)))
            .count();
        assert_eq!(draws, 1);
    }

    #[test]
    fn test_empty_list_skips_framebuffer_bind() {
        let device = NullDevice::new();
        let mut pass = test_pass(&device);
        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &camera_context(), &[]);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        assert!(!journal
            .iter()
            .any(|c| matches!(c, RecordedCommand::BindFramebuffer(_))));
    }
}
