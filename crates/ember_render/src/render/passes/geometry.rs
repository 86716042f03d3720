//! G-buffer fill

use std::any::Any;

use crate::render::frame::{FrameContext, Renderable};
use crate::render::graph::{RenderPass, RenderTargets};
use crate::render::material::MaterialValue;
use crate::scene::frustum::cull_by_camera_frustum;
use crate::rhi::{
    ClearFlags, CommandBuffer, CompareFunc, CullMode, Device, FramebufferHandle,
    PipelineStateDesc, PipelineStateHandle, PixelFormat,
};

/// Draw-buffer layout of the G-buffer: albedo, normal, emissive
const GBUFFER_FORMATS: [PixelFormat; 3] = [
    PixelFormat::Rgba8Unorm,
    PixelFormat::Rgba16Float,
    PixelFormat::Rgba8Unorm,
];

/// Rasterizes opaque geometry into the G-buffer
pub struct GeometryPass {
    framebuffer: FramebufferHandle,
    width: u32,
    height: u32,
    pipeline: Option<PipelineStateHandle>,
}

impl GeometryPass {
    /// Creates the pass against the current G-buffer
    pub fn new(device: &dyn Device, targets: &RenderTargets) -> Self {
        let pipeline = super::create_pipeline_or_disable(
            device,
            &PipelineStateDesc {
                label: "deferred_geometry",
                vertex_source: include_str!("../../../shaders/deferred_geometry.vert"),
                fragment_source: include_str!("../../../shaders/deferred_geometry.frag"),
            },
        );
        Self {
            framebuffer: targets.gbuffer.clone(),
            width: targets.width,
            height: targets.height,
            pipeline,
        }
    }
}

impl RenderPass for GeometryPass {
    fn name(&self) -> &str {
        "geometry"
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

        cmd.bind_framebuffer(Some(&self.framebuffer));
        cmd.set_viewport(0, 0, self.width, self.height);
        cmd.set_draw_buffers(&GBUFFER_FORMATS);
        cmd.clear(0.0, 0.0, 0.0, 1.0, ClearFlags::COLOR | ClearFlags::DEPTH);
        cmd.set_depth_test(true, true, CompareFunc::Less);
        cmd.set_cull_mode(CullMode::Back);
        cmd.set_pipeline_state(pipeline);

        for renderable in &visible {
            let mut material = renderable.material.borrow_mut();
            material.set_parameter("model", MaterialValue::Mat4(renderable.world_matrix));
            material.set_parameter("view", MaterialValue::Mat4(context.view_matrix));
            material.set_parameter(
                "projection",
                MaterialValue::Mat4(context.projection_matrix),
            );
            material.bind(cmd);
            cmd.bind_vertex_buffer(&renderable.vertex_buffer);
            cmd.bind_index_buffer(&renderable.index_buffer);
            cmd.draw_indexed(renderable.index_count, 1);
        }
    }

    fn rebind_targets(&mut self, targets: &RenderTargets) {
        self.framebuffer = targets.gbuffer.clone();
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
    use crate::render::frame::Renderable;
    use crate::render::material::MaterialInstance;
    use crate::render::scene_renderer::create_render_targets;
    use crate::rhi::{BufferKind, BufferUsage, NullDevice, RecordedCommand};

    fn test_renderable(device: &NullDevice) -> Renderable {
        let vb = device
            .create_buffer(BufferKind::Vertex, BufferUsage::Static, 64, None)
            .unwrap();
        let ib = device
            .create_buffer(BufferKind::Index, BufferUsage::Static, 24, None)
            .unwrap();
        Renderable::new(vb, ib, 6, MaterialInstance::new("m").into_handle())
    }

    #[test]
    fn test_geometry_pass_sets_mrt_draw_buffers() {
        let device = NullDevice::new();
        let targets = create_render_targets(&device, 640, 480).unwrap();
        let mut pass = GeometryPass::new(&device, &targets);
        let list = vec![test_renderable(&device)];

        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &FrameContext::default(), &list);
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        assert!(journal.contains(&RecordedCommand::SetDrawBuffers(GBUFFER_FORMATS.to_vec())));
        assert!(journal.contains(&RecordedCommand::DrawIndexed(6, 1)));
    }

    #[test]
    fn test_geometry_pass_stamps_matrix_parameters() {
        use std::cell::RefCell;
        use std::rc::Rc;

        use crate::foundation::math::{Mat4, Vec3};
        use crate::render::material::MaterialValue;

        let device = NullDevice::new();
        let targets = create_render_targets(&device, 640, 480).unwrap();
        let mut pass = GeometryPass::new(&device, &targets);

        let concrete = Rc::new(RefCell::new(MaterialInstance::new("m")));
        let vb = device
            .create_buffer(BufferKind::Vertex, BufferUsage::Static, 64, None)
            .unwrap();
        let ib = device
            .create_buffer(BufferKind::Index, BufferUsage::Static, 24, None)
            .unwrap();
        let mut renderable = Renderable::new(vb, ib, 6, concrete.clone());
        renderable.world_matrix = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let world = renderable.world_matrix;

        let ctx = FrameContext {
            enable_frustum_culling: false,
            ..Default::default()
        };
        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), &ctx, &[renderable]);
        cmd.end();

        let stamped = concrete.borrow().parameter("model");
        match stamped {
            Some(MaterialValue::Mat4(m)) => assert_eq!(m, world),
            other => panic!("model parameter not stamped: {other:?}"),
        }
    }
}
