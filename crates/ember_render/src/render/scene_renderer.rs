//! Frame orchestration for the deferred + forward hybrid pipeline

use log::{debug, info};

use crate::config::RendererSettings;
use crate::render::frame::{FrameContext, Renderable};
use crate::render::geometry::create_sphere;
use crate::render::graph::{RenderGraph, RenderTargets};
use crate::render::material::MaterialValue;
use crate::render::passes::{
    ForwardPass, GeometryPass, LightingPass, PostProcessPass, ShadowPass,
};
use crate::render::{RenderError, RenderResult};
use crate::rhi::{
    CommandBuffer, CompareFunc, CullMode, Device, DeviceHandle, FramebufferDesc, PixelFormat,
    TextureHandle,
};

/// Builds the three size-dependent framebuffers and their attachments
///
/// The lighting and forward framebuffers share one HDR color texture, and
/// the forward framebuffer re-attaches the G-buffer depth texture. Those
/// two aliases are the data flow of the whole pipeline.
pub fn create_render_targets(
    device: &dyn Device,
    width: u32,
    height: u32,
) -> RenderResult<RenderTargets> {
    let gbuffer_albedo = device.create_texture(width, height, PixelFormat::Rgba8Unorm, None)?;
    let gbuffer_normal = device.create_texture(width, height, PixelFormat::Rgba16Float, None)?;
    let gbuffer_emissive = device.create_texture(width, height, PixelFormat::Rgba8Unorm, None)?;
    let gbuffer_depth =
        device.create_texture(width, height, PixelFormat::Depth24Stencil8, None)?;
    let hdr_color = device.create_texture(width, height, PixelFormat::Rgba16Float, None)?;

    let gbuffer = device.create_framebuffer(&FramebufferDesc {
        width,
        height,
        depth_attachment: Some(gbuffer_depth.clone()),
        color_attachments: vec![
            gbuffer_albedo.clone(),
            gbuffer_normal.clone(),
            gbuffer_emissive.clone(),
        ],
    })?;

    // No depth attachment: light volumes are shaded against the sampled
    // G-buffer depth, not a rasterizer depth test
    let lighting = device.create_framebuffer(&FramebufferDesc {
        width,
        height,
        depth_attachment: None,
        color_attachments: vec![hdr_color.clone()],
    })?;

    let forward = device.create_framebuffer(&FramebufferDesc {
        width,
        height,
        depth_attachment: Some(gbuffer_depth.clone()),
        color_attachments: vec![hdr_color.clone()],
    })?;

    Ok(RenderTargets {
        width,
        height,
        gbuffer,
        gbuffer_albedo,
        gbuffer_normal,
        gbuffer_emissive,
        gbuffer_depth,
        hdr_color,
        lighting,
        forward,
    })
}

/// Owns the pass sequence and the render targets, and turns collected
/// draw lists into submitted frames
pub struct SceneRenderer {
    device: DeviceHandle,
    settings: RendererSettings,
    graph: RenderGraph,
    targets: Option<RenderTargets>,
    shadow_map: Option<TextureHandle>,
}

impl SceneRenderer {
    /// Creates an uninitialized renderer; call [`init`](Self::init) with
    /// the surface size before rendering
    pub fn new(device: DeviceHandle, settings: RendererSettings) -> Self {
        Self {
            device,
            settings,
            graph: RenderGraph::new(),
            targets: None,
            shadow_map: None,
        }
    }

    /// Builds render targets and the five passes for the given surface size
    pub fn init(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InitializationFailed(format!(
                "surface size {width}x{height} is not renderable"
            )));
        }

        let device = self.device.as_ref();
        let targets = create_render_targets(device, width, height)?;

        let shadow = ShadowPass::new(device, self.settings.shadow_map_size)?;
        let shadow_map = shadow.depth_map().clone();
        let light_volume = create_sphere(device)?;

        let mut graph = RenderGraph::new();
        graph.add_pass(Box::new(shadow));
        graph.add_pass(Box::new(GeometryPass::new(device, &targets)));
        graph.add_pass(Box::new(LightingPass::new(
            device,
            &targets,
            shadow_map.clone(),
            light_volume,
            self.settings.max_point_lights,
        )));
        graph.add_pass(Box::new(ForwardPass::new(
            device,
            &targets,
            shadow_map.clone(),
        )));
        graph.add_pass(Box::new(PostProcessPass::new(
            device,
            &targets,
            self.settings.exposure,
        )));

        info!(
            "scene renderer initialized: {width}x{height}, shadow map {}px, {} passes",
            self.settings.shadow_map_size,
            graph.len()
        );
        self.graph = graph;
        self.targets = Some(targets);
        self.shadow_map = Some(shadow_map);
        Ok(())
    }

    /// Records and submits one frame
    ///
    /// `deferred` feeds the shadow and geometry stages, `forward` the
    /// forward stage. An uninitialized renderer skips the frame.
    pub fn render(
        &mut self,
        context: &FrameContext,
        deferred: &[Renderable],
        forward: &[Renderable],
    ) -> RenderResult<()> {
        if self.targets.is_none() {
            debug!("render skipped: no render targets");
            return Ok(());
        }

        self.stamp_shadow_map(deferred);
        self.stamp_shadow_map(forward);

        let mut ctx = context.clone();
        ctx.enable_frustum_culling &= self.settings.enable_frustum_culling;

        let mut cmd = self.device.create_command_buffer();
        cmd.begin();
        for pass in self.graph.passes_mut() {
            reset_render_state(cmd.as_mut());
            let list: &[Renderable] = match pass.name() {
                "shadow" | "geometry" => deferred,
                "forward" => forward,
                _ => &[],
            };
            pass.execute(cmd.as_mut(), &ctx, list);
        }
        cmd.end();
        self.device.submit(cmd.as_mut());
        Ok(())
    }

    /// Recreates the size-dependent targets and re-points every pass
    ///
    /// Zero or unchanged dimensions are ignored, so windowing backends may
    /// report resize events as often as they like.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if let Some(targets) = &self.targets {
            if targets.width == width && targets.height == height {
                return Ok(());
            }
        }

        let targets = create_render_targets(self.device.as_ref(), width, height)?;
        for pass in self.graph.passes_mut() {
            pass.rebind_targets(&targets);
        }
        debug!("render targets resized to {width}x{height}");
        self.targets = Some(targets);
        Ok(())
    }

    /// Light statistics from the last frame: (candidates, drawn)
    pub fn light_counts(&self) -> Option<(u32, u32)> {
        let pass = self.graph.find_pass("lighting")?;
        let lighting = pass.as_any().downcast_ref::<LightingPass>()?;
        Some((
            lighting.candidate_light_count(),
            lighting.visible_light_count(),
        ))
    }

    /// G-buffer albedo texture, for debug visualization
    pub fn gbuffer_albedo(&self) -> Option<&TextureHandle> {
        self.targets.as_ref().map(|t| &t.gbuffer_albedo)
    }

    /// G-buffer normal texture, for debug visualization
    pub fn gbuffer_normal(&self) -> Option<&TextureHandle> {
        self.targets.as_ref().map(|t| &t.gbuffer_normal)
    }

    /// G-buffer depth texture, for debug visualization
    pub fn gbuffer_depth(&self) -> Option<&TextureHandle> {
        self.targets.as_ref().map(|t| &t.gbuffer_depth)
    }

    /// HDR accumulation texture, for debug visualization
    pub fn hdr_color(&self) -> Option<&TextureHandle> {
        self.targets.as_ref().map(|t| &t.hdr_color)
    }

    /// Current render targets
    pub fn targets(&self) -> Option<&RenderTargets> {
        self.targets.as_ref()
    }

    fn stamp_shadow_map(&self, renderables: &[Renderable]) {
        let Some(shadow_map) = &self.shadow_map else {
            return;
        };
        for renderable in renderables {
            renderable
                .material
                .borrow_mut()
                .set_parameter("shadowMap", MaterialValue::Texture(shadow_map.clone()));
        }
    }
}

/// Returns the command stream to the baseline state passes assume
///
/// Every pass may rely on this exact state on entry: blending off, depth
/// test and write on with less-equal, back-face culling.
fn reset_render_state(cmd: &mut dyn CommandBuffer) {
    cmd.set_blend_state(false);
    cmd.set_depth_test(true, true, CompareFunc::LessEqual);
    cmd.set_cull_mode(CullMode::Back);
}
