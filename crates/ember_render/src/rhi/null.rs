//! Headless null backend
//!
//! A complete RHI implementation that records every command into an
//! inspectable journal instead of talking to a GPU. It backs the test
//! suite (pass ordering, state resets, resize behavior) and is useful as a
//! reference when bringing up a real backend: any sequence the null device
//! accepts is a sequence a backend must handle.
//!
//! Resource creation is counted per category, and pipeline creation can be
//! made to fail on demand to exercise the pass self-disable path.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::command::CommandBuffer;
use super::device::Device;
use super::resources::{
    BufferHandle, Framebuffer, FramebufferDesc, FramebufferHandle, GpuBuffer, GpuTexture,
    PipelineState, PipelineStateDesc, PipelineStateHandle, TextureHandle,
};
use super::types::{
    BlendFactor, BufferKind, BufferUsage, ClearFlags, CompareFunc, CullMode, PixelFormat,
    UniformValue,
};
use crate::render::{RenderError, RenderResult};

/// One entry in the null backend's command journal
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// Recording started
    Begin,
    /// Recording ended
    End,
    /// Render target bound (`None` = display surface)
    BindFramebuffer(Option<u64>),
    /// Viewport set
    SetViewport(u32, u32, u32, u32),
    /// Clear issued
    Clear {
        /// Clear color
        color: [f32; 4],
        /// Affected aspects
        flags: ClearFlags,
    },
    /// MRT draw-buffer selection
    SetDrawBuffers(Vec<PixelFormat>),
    /// Depth bias (constant, slope)
    SetDepthBias(f32, f32),
    /// Blend enable/disable
    SetBlendState(bool),
    /// Blend function
    SetBlendFunc(BlendFactor, BlendFactor),
    /// Depth test configuration (enabled, write, func)
    SetDepthTest(bool, bool, CompareFunc),
    /// Face culling mode
    SetCullMode(CullMode),
    /// Pipeline state bound, by label
    SetPipelineState(String),
    /// Vertex buffer bound, by resource id
    BindVertexBuffer(u64),
    /// Index buffer bound, by resource id
    BindIndexBuffer(u64),
    /// Texture bound to a sampler slot, by resource id
    BindTexture(u32, u64),
    /// Uniform uploaded
    SetUniform(u32, UniformValue),
    /// Non-indexed draw (vertex count, instance count)
    Draw(u32, u32),
    /// Indexed draw (index count, instance count)
    DrawIndexed(u32, u32),
}

struct NullBuffer {
    size: u32,
    kind: BufferKind,
}

impl GpuBuffer for NullBuffer {
    fn size(&self) -> u32 {
        self.size
    }

    fn kind(&self) -> BufferKind {
        self.kind
    }
}

struct NullTexture {
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl GpuTexture for NullTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }
}

struct NullFramebuffer {
    width: u32,
    height: u32,
    depth_attachment: Option<TextureHandle>,
    color_attachments: Vec<TextureHandle>,
}

impl Framebuffer for NullFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn depth_attachment(&self) -> Option<TextureHandle> {
        self.depth_attachment.clone()
    }

    fn color_attachment(&self, index: usize) -> Option<TextureHandle> {
        self.color_attachments.get(index).cloned()
    }
}

struct NullPipelineState {
    label: String,
}

impl PipelineState for NullPipelineState {
    fn label(&self) -> &str {
        &self.label
    }
}

type Journal = Rc<RefCell<Vec<RecordedCommand>>>;

/// Command buffer that appends every call to the shared journal
pub struct NullCommandBuffer {
    journal: Journal,
    recording: bool,
}

impl NullCommandBuffer {
    fn record(&mut self, cmd: RecordedCommand) {
        debug_assert!(self.recording, "command recorded outside begin/end");
        self.journal.borrow_mut().push(cmd);
    }
}

impl CommandBuffer for NullCommandBuffer {
    fn begin(&mut self) {
        debug_assert!(!self.recording, "begin called while already recording");
        self.recording = true;
        self.journal.borrow_mut().push(RecordedCommand::Begin);
    }

    fn end(&mut self) {
        debug_assert!(self.recording, "end called without begin");
        self.journal.borrow_mut().push(RecordedCommand::End);
        self.recording = false;
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<&FramebufferHandle>) {
        let id = framebuffer.map(handle_id);
        self.record(RecordedCommand::BindFramebuffer(id));
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.record(RecordedCommand::SetViewport(x, y, width, height));
    }

    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32, flags: ClearFlags) {
        self.record(RecordedCommand::Clear {
            color: [r, g, b, a],
            flags,
        });
    }

    fn set_draw_buffers(&mut self, formats: &[PixelFormat]) {
        self.record(RecordedCommand::SetDrawBuffers(formats.to_vec()));
    }

    fn set_depth_bias(&mut self, constant: f32, slope: f32) {
        self.record(RecordedCommand::SetDepthBias(constant, slope));
    }

    fn set_blend_state(&mut self, enabled: bool) {
        self.record(RecordedCommand::SetBlendState(enabled));
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(RecordedCommand::SetBlendFunc(src, dst));
    }

    fn set_depth_test(&mut self, enabled: bool, write_enabled: bool, func: CompareFunc) {
        self.record(RecordedCommand::SetDepthTest(enabled, write_enabled, func));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.record(RecordedCommand::SetCullMode(mode));
    }

    fn set_pipeline_state(&mut self, pso: &PipelineStateHandle) {
        self.record(RecordedCommand::SetPipelineState(pso.label().to_owned()));
    }

    fn bind_vertex_buffer(&mut self, buffer: &BufferHandle) {
        let id = handle_id(buffer);
        self.record(RecordedCommand::BindVertexBuffer(id));
    }

    fn bind_index_buffer(&mut self, buffer: &BufferHandle) {
        let id = handle_id(buffer);
        self.record(RecordedCommand::BindIndexBuffer(id));
    }

    fn bind_texture(&mut self, slot: u32, texture: &TextureHandle) {
        let id = handle_id(texture);
        self.record(RecordedCommand::BindTexture(slot, id));
    }

    fn set_uniform(&mut self, location: u32, value: UniformValue) {
        self.record(RecordedCommand::SetUniform(location, value));
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) {
        self.record(RecordedCommand::Draw(vertex_count, instance_count));
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.record(RecordedCommand::DrawIndexed(index_count, instance_count));
    }
}

/// Headless device recording all activity for later inspection
#[derive(Default)]
pub struct NullDevice {
    buffers_created: Cell<u32>,
    textures_created: Cell<u32>,
    framebuffers_created: Cell<u32>,
    pipelines_created: Cell<u32>,
    submits: Cell<u32>,
    fail_labels: RefCell<Vec<String>>,
    journal: Journal,
}

impl NullDevice {
    /// Create a fresh null device
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh null device wrapped in a shareable handle
    #[must_use]
    pub fn new_handle() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Total buffers created so far
    #[must_use]
    pub fn buffers_created(&self) -> u32 {
        self.buffers_created.get()
    }

    /// Total textures created so far
    #[must_use]
    pub fn textures_created(&self) -> u32 {
        self.textures_created.get()
    }

    /// Total framebuffers created so far
    #[must_use]
    pub fn framebuffers_created(&self) -> u32 {
        self.framebuffers_created.get()
    }

    /// Total pipeline states created so far
    #[must_use]
    pub fn pipelines_created(&self) -> u32 {
        self.pipelines_created.get()
    }

    /// Total command buffers submitted so far
    #[must_use]
    pub fn submits(&self) -> u32 {
        self.submits.get()
    }

    /// Make every future pipeline creation whose label contains
    /// `label_substring` fail with a compile diagnostic
    pub fn fail_pipeline_creation(&self, label_substring: &str) {
        self.fail_labels
            .borrow_mut()
            .push(label_substring.to_owned());
    }

    /// Drain and return the recorded command journal
    #[must_use]
    pub fn take_journal(&self) -> Vec<RecordedCommand> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }
}

impl Device for NullDevice {
    fn create_buffer(
        &self,
        kind: BufferKind,
        usage: BufferUsage,
        size: u32,
        data: Option<&[u8]>,
    ) -> RenderResult<BufferHandle> {
        let _ = usage;
        if let Some(bytes) = data {
            if bytes.len() as u32 != size {
                return Err(RenderError::ResourceCreationFailed(format!(
                    "buffer initial data is {} bytes but size is {size}",
                    bytes.len()
                )));
            }
        }
        self.buffers_created.set(self.buffers_created.get() + 1);
        Ok(Rc::new(NullBuffer { size, kind }))
    }

    fn create_texture(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        _data: Option<&[u8]>,
    ) -> RenderResult<TextureHandle> {
        if width == 0 || height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "zero-area texture requested ({width}x{height})"
            )));
        }
        self.textures_created.set(self.textures_created.get() + 1);
        Ok(Rc::new(NullTexture {
            width,
            height,
            format,
        }))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> RenderResult<FramebufferHandle> {
        if desc.depth_attachment.is_none() && desc.color_attachments.is_empty() {
            return Err(RenderError::ResourceCreationFailed(
                "framebuffer needs at least one attachment".to_owned(),
            ));
        }
        self.framebuffers_created
            .set(self.framebuffers_created.get() + 1);
        Ok(Rc::new(NullFramebuffer {
            width: desc.width,
            height: desc.height,
            depth_attachment: desc.depth_attachment.clone(),
            color_attachments: desc.color_attachments.clone(),
        }))
    }

    fn create_pipeline_state(
        &self,
        desc: &PipelineStateDesc<'_>,
    ) -> RenderResult<PipelineStateHandle> {
        let should_fail = self
            .fail_labels
            .borrow()
            .iter()
            .any(|s| desc.label.contains(s.as_str()));
        if should_fail {
            return Err(RenderError::ShaderCompilation {
                label: desc.label.to_owned(),
                log: "injected compile failure".to_owned(),
            });
        }
        self.pipelines_created.set(self.pipelines_created.get() + 1);
        Ok(Rc::new(NullPipelineState {
            label: desc.label.to_owned(),
        }))
    }

    fn create_command_buffer(&self) -> Box<dyn CommandBuffer> {
        Box::new(NullCommandBuffer {
            journal: Rc::clone(&self.journal),
            recording: false,
        })
    }

    fn submit(&self, _cmd: &mut dyn CommandBuffer) {
        self.submits.set(self.submits.get() + 1);
    }
}

/// Journal identity for a shared resource handle
///
/// Uses `Rc` pointer identity, so two journal entries carry the same id
/// exactly when they bind the same underlying resource. Tests lean on this
/// to verify that the G-buffer depth texture really is the one aliased
/// into the forward framebuffer, and that resize hands out fresh handles.
fn handle_id<T: ?Sized>(handle: &Rc<T>) -> u64 {
    Rc::as_ptr(handle).cast::<()>() as u64
}
