//! Deferred lighting: additive light volumes over the G-buffer

use std::any::Any;

use crate::foundation::math::Mat4;
use crate::render::frame::{FrameContext, PointLight, Renderable};
use crate::render::geometry::GpuMesh;
use crate::render::graph::{RenderPass, RenderTargets};
use crate::render::material::uniform_location;
use crate::rhi::{
    BlendFactor, ClearFlags, CommandBuffer, CompareFunc, CullMode, Device, FramebufferHandle,
    PipelineStateDesc, PipelineStateHandle, TextureHandle, UniformValue,
};
use crate::scene::frustum::{extract_planes, is_sphere_visible};

/// Radius of the stand-in volume drawn for the sun when the scene has no
/// point lights; large enough to cover any plausible scene
const FALLBACK_SUN_RADIUS: f32 = 1000.0;

/// Shades the G-buffer by drawing one scaled sphere per visible light
///
/// Volumes are drawn front-face-culled with additive blending and depth
/// testing off, so a camera inside a volume still shades correctly and
/// overlapping lights accumulate.
pub struct LightingPass {
    framebuffer: FramebufferHandle,
    gbuffer_albedo: TextureHandle,
    gbuffer_normal: TextureHandle,
    gbuffer_depth: TextureHandle,
    shadow_map: TextureHandle,
    light_volume: GpuMesh,
    width: u32,
    height: u32,
    max_point_lights: usize,
    pipeline: Option<PipelineStateHandle>,
    candidate_lights: u32,
    visible_lights: u32,
}

impl LightingPass {
    /// Creates the pass against the current targets and shadow map
    pub fn new(
        device: &dyn Device,
        targets: &RenderTargets,
        shadow_map: TextureHandle,
        light_volume: GpuMesh,
        max_point_lights: usize,
    ) -> Self {
        let pipeline = super::create_pipeline_or_disable(
            device,
            &PipelineStateDesc {
                label: "deferred_lighting",
                vertex_source: include_str!("../../../shaders/deferred_lighting.vert"),
                fragment_source: include_str!("../../../shaders/deferred_lighting.frag"),
            },
        );
        Self {
            framebuffer: targets.lighting.clone(),
            gbuffer_albedo: targets.gbuffer_albedo.clone(),
            gbuffer_normal: targets.gbuffer_normal.clone(),
            gbuffer_depth: targets.gbuffer_depth.clone(),
            shadow_map,
            light_volume,
            width: targets.width,
            height: targets.height,
            max_point_lights,
            pipeline,
            candidate_lights: 0,
            visible_lights: 0,
        }
    }

    /// Lights offered by the scene last frame, before culling
    pub fn candidate_light_count(&self) -> u32 {
        self.candidate_lights
    }

    /// Lights that survived frustum culling last frame
    pub fn visible_light_count(&self) -> u32 {
        self.visible_lights
    }

    fn draw_volume(&self, cmd: &mut dyn CommandBuffer, light: &PointLight) {
        let model =
            Mat4::new_translation(&light.position) * Mat4::new_scaling(light.radius.max(0.001));
        cmd.set_uniform(uniform_location("model"), UniformValue::Mat4(model));
        cmd.set_uniform(
            uniform_location("lightPosition"),
            UniformValue::Vec3(light.position),
        );
        cmd.set_uniform(
            uniform_location("lightColor"),
            UniformValue::Vec3(light.color),
        );
        cmd.set_uniform(
            uniform_location("lightRadius"),
            UniformValue::Float(light.radius),
        );
        cmd.set_uniform(
            uniform_location("lightIntensity"),
            UniformValue::Float(light.intensity),
        );
        cmd.draw_indexed(self.light_volume.index_count, 1);
    }
}

impl RenderPass for LightingPass {
    fn name(&self) -> &str {
        "lighting"
    }

    fn execute(
        &mut self,
        cmd: &mut dyn CommandBuffer,
        context: &FrameContext,
        _renderables: &[Renderable],
    ) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };

        cmd.bind_framebuffer(Some(&self.framebuffer));
        cmd.set_viewport(0, 0, self.width, self.height);
        cmd.clear(0.0, 0.0, 0.0, 1.0, ClearFlags::COLOR);
        cmd.set_blend_state(true);
        cmd.set_blend_func(BlendFactor::One, BlendFactor::One);
        cmd.set_depth_test(false, false, CompareFunc::Always);
        // Front-face culling keeps volumes shading while the camera is inside them
        cmd.set_cull_mode(CullMode::Front);
        cmd.set_pipeline_state(pipeline);

        cmd.bind_texture(0, &self.gbuffer_albedo);
        cmd.bind_texture(1, &self.gbuffer_normal);
        cmd.bind_texture(2, &self.gbuffer_depth);
        cmd.bind_texture(3, &self.shadow_map);

        let view_projection = context.view_projection();
        let inv_view_projection = view_projection.try_inverse().unwrap_or_else(Mat4::identity);
        cmd.set_uniform(
            uniform_location("view"),
            UniformValue::Mat4(context.view_matrix),
        );
        cmd.set_uniform(
            uniform_location("projection"),
            UniformValue::Mat4(context.projection_matrix),
        );
        cmd.set_uniform(
            uniform_location("invViewProjection"),
            UniformValue::Mat4(inv_view_projection),
        );
        cmd.set_uniform(
            uniform_location("camPos"),
            UniformValue::Vec3(context.camera_position),
        );
        cmd.set_uniform(
            uniform_location("lightSpaceMatrix"),
            UniformValue::Mat4(context.light_space_matrix),
        );

        cmd.bind_vertex_buffer(&self.light_volume.vertex_buffer);
        cmd.bind_index_buffer(&self.light_volume.index_buffer);

        self.candidate_lights = context.point_lights.len() as u32;
        if context.point_lights.is_empty() {
            // Never leave the scene unlit: shade once from the sun instead
            let sun = PointLight {
                position: context.sun_position,
                color: context.sun_color,
                intensity: 1.0,
                radius: FALLBACK_SUN_RADIUS,
            };
            self.visible_lights = 0;
            self.draw_volume(cmd, &sun);
        } else {
            let planes = extract_planes(&view_projection);
            let mut drawn = 0u32;
            for light in &context.point_lights {
                if drawn as usize >= self.max_point_lights {
                    break;
                }
                if context.enable_frustum_culling
                    && !is_sphere_visible(&planes, light.position, light.radius)
                {
                    continue;
                }
                self.draw_volume(cmd, light);
                drawn += 1;
            }
            self.visible_lights = drawn;
            log::trace!(
                "lighting: {} of {} lights drawn",
                drawn,
                self.candidate_lights
            );
        }
    }

    fn rebind_targets(&mut self, targets: &RenderTargets) {
        self.framebuffer = targets.lighting.clone();
        self.gbuffer_albedo = targets.gbuffer_albedo.clone();
        self.gbuffer_normal = targets.gbuffer_normal.clone();
        self.gbuffer_depth = targets.gbuffer_depth.clone();
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
    use crate::foundation::math::{deg_to_rad, Mat4Ext, Vec3};
    use crate::render::geometry::create_sphere;
    use crate::render::scene_renderer::create_render_targets;
    use crate::rhi::{NullDevice, PixelFormat, RecordedCommand};

    fn test_pass(device: &NullDevice) -> LightingPass {
        let targets = create_render_targets(device, 640, 480).unwrap();
        let shadow_map = device
            .create_texture(2048, 2048, PixelFormat::Depth24, None)
            .unwrap();
        let sphere = create_sphere(device).unwrap();
        LightingPass::new(device, &targets, shadow_map, sphere, 32)
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

    fn run(pass: &mut LightingPass, device: &NullDevice, ctx: &FrameContext) -> Vec<RecordedCommand> {
        let mut cmd = device.create_command_buffer();
        cmd.begin();
        pass.execute(cmd.as_mut(), ctx, &[]);
        cmd.end();
        device.submit(cmd.as_mut());
        device.take_journal()
    }

    fn count_draws(journal: &[RecordedCommand]) -> usize {
        journal
            .iter()
            .filter(|c| matches!(c, RecordedCommand::DrawIndexed(..)))
            .count()
    }

    #[test]
    fn test_no_lights_draws_sun_fallback_once() {
        let device = NullDevice::new();
        let mut pass = test_pass(&device);
        let journal = run(&mut pass, &device, &camera_context());
        assert_eq!(count_draws(&journal), 1);
        assert_eq!(pass.candidate_light_count(), 0);
        assert_eq!(pass.visible_light_count(), 0);
    }

    #[test]
    fn test_offscreen_lights_are_culled() {
        let device = NullDevice::new();
        let mut pass = test_pass(&device);
        let mut ctx = camera_context();
        ctx.point_lights = vec![
            PointLight {
                position: Vec3::new(0.0, 0.0, -10.0),
                ..Default::default()
            },
            PointLight {
                position: Vec3::new(500.0, 0.0, 50.0),
                ..Default::default()
            },
        ];
        let journal = run(&mut pass, &device, &ctx);
        assert_eq!(count_draws(&journal), 1);
        assert_eq!(pass.candidate_light_count(), 2);
        assert_eq!(pass.visible_light_count(), 1);
    }

    #[test]
    fn test_light_budget_is_enforced() {
        let device = NullDevice::new();
        let targets = create_render_targets(&device, 640, 480).unwrap();
        let shadow_map = device
            .create_texture(2048, 2048, PixelFormat::Depth24, None)
            .unwrap();
        let sphere = create_sphere(&device).unwrap();
        let mut pass = LightingPass::new(&device, &targets, shadow_map, sphere, 2);

        let mut ctx = camera_context();
        ctx.point_lights = (0..5)
            .map(|i| PointLight {
                position: Vec3::new(i as f32, 0.0, -10.0),
                ..Default::default()
            })
            .collect();
        let journal = run(&mut pass, &device, &ctx);
        assert_eq!(count_draws(&journal), 2);
        assert_eq!(pass.visible_light_count(), 2);
    }

    #[test]
    fn test_additive_blend_state() {
        let device = NullDevice::new();
        let mut pass = test_pass(&device);
        let journal = run(&mut pass, &device, &camera_context());
        assert!(journal.contains(&RecordedCommand::SetBlendState(true)));
        assert!(journal.contains(&RecordedCommand::SetBlendFunc(
            BlendFactor::One,
            BlendFactor::One
        )));
        assert!(journal.contains(&RecordedCommand::SetCullMode(CullMode::Front)));
        assert!(journal.contains(&RecordedCommand::SetDepthTest(
            false,
            false,
            CompareFunc::Always
        )));
    }

    #[test]
    fn test_disabled_culling_draws_every_light() {
        let device = NullDevice::new();
        let mut pass = test_pass(&device);
        let mut ctx = camera_context();
        ctx.enable_frustum_culling = false;
        ctx.point_lights = vec![
            PointLight {
                position: Vec3::new(500.0, 0.0, 50.0),
                ..Default::default()
            };
            3
        ];
        let journal = run(&mut pass, &device, &ctx);
        assert_eq!(count_draws(&journal), 3);
    }
}
