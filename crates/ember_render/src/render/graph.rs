//! Pass orchestration
//!
//! The graph is deliberately simple: a `Vec` of boxed passes executed in
//! insertion order. Insertion order *is* the dependency order; there is no
//! dependency solver. The fixed deferred pipeline has exactly one valid
//! order, so a solver would only add moving parts.

use std::any::Any;

use crate::render::frame::{FrameContext, Renderable};
use crate::rhi::{CommandBuffer, FramebufferHandle, TextureHandle};

/// The size-dependent render targets shared by the passes
///
/// The HDR color texture is attached to both the lighting and the forward
/// framebuffer, and the forward framebuffer also re-attaches the G-buffer
/// depth texture. That aliasing is what lets the forward stage depth-test
/// against deferred geometry and the post stage read one combined image.
#[derive(Clone)]
pub struct RenderTargets {
    /// Current width in pixels
    pub width: u32,
    /// Current height in pixels
    pub height: u32,
    /// G-buffer framebuffer (albedo + normal + emissive + depth)
    pub gbuffer: FramebufferHandle,
    /// G-buffer color 0: albedo
    pub gbuffer_albedo: TextureHandle,
    /// G-buffer color 1: world-space normals, half float
    pub gbuffer_normal: TextureHandle,
    /// G-buffer color 2: emissive
    pub gbuffer_emissive: TextureHandle,
    /// G-buffer depth, re-attached to the forward framebuffer
    pub gbuffer_depth: TextureHandle,
    /// HDR color accumulation texture, shared by lighting and forward
    pub hdr_color: TextureHandle,
    /// Lighting framebuffer: HDR color, no depth
    pub lighting: FramebufferHandle,
    /// Forward framebuffer: HDR color + G-buffer depth
    pub forward: FramebufferHandle,
}

/// A single stage of the pipeline
pub trait RenderPass {
    /// Stage name, for logs
    fn name(&self) -> &str;

    /// Records this stage's commands for the frame
    ///
    /// `renderables` is the draw list the orchestrator routed to this
    /// stage; stages that draw from other sources (light volumes, the
    /// fullscreen pass) receive an empty slice.
    fn execute(
        &mut self,
        cmd: &mut dyn CommandBuffer,
        context: &FrameContext,
        renderables: &[Renderable],
    );

    /// Re-points any held attachment references after a resize
    ///
    /// Stages with only size-independent resources keep the default no-op.
    fn rebind_targets(&mut self, targets: &RenderTargets) {
        let _ = targets;
    }

    /// Downcasting hook, used to reach pass-specific diagnostics
    fn as_any(&self) -> &dyn Any;
}

/// Ordered collection of passes
#[derive(Default)]
pub struct RenderGraph {
    passes: Vec<Box<dyn RenderPass>>,
}

impl RenderGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pass; it will run after every pass added before it
    pub fn add_pass(&mut self, pass: Box<dyn RenderPass>) {
        log::debug!("render graph: added pass '{}'", pass.name());
        self.passes.push(pass);
    }

    /// Number of passes in the graph
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether the graph has no passes
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Iterates passes in execution order
    pub fn passes(&self) -> impl Iterator<Item = &dyn RenderPass> {
        self.passes.iter().map(Box::as_ref)
    }

    /// Iterates passes mutably in execution order
    pub fn passes_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn RenderPass>> {
        self.passes.iter_mut()
    }

    /// Finds a pass by name
    pub fn find_pass(&self, name: &str) -> Option<&dyn RenderPass> {
        self.passes().find(|p| p.name() == name)
    }
}
