//! The five fixed stages of the pipeline
//!
//! Execution order is shadow, geometry, lighting, forward, post-process.
//! Each pass owns its pipeline state; a pass whose pipeline failed to
//! build logs one warning at construction and skips execution for the
//! rest of the session instead of failing the frame.

pub mod forward;
pub mod geometry;
pub mod lighting;
pub mod post_process;
pub mod shadow;

pub use forward::ForwardPass;
pub use geometry::GeometryPass;
pub use lighting::LightingPass;
pub use post_process::PostProcessPass;
pub use shadow::ShadowPass;

use log::warn;

use crate::rhi::{Device, PipelineStateDesc, PipelineStateHandle};

/// Builds a pipeline, degrading to `None` on compile failure
///
/// The warning here is the single log line the failure gets; callers
/// treat `None` as "pass disabled".
pub(crate) fn create_pipeline_or_disable(
    device: &dyn Device,
    desc: &PipelineStateDesc<'_>,
) -> Option<PipelineStateHandle> {
    match device.create_pipeline_state(desc) {
        Ok(pipeline) => Some(pipeline),
        Err(err) => {
            warn!("pass '{}' disabled: {err}", desc.label);
            None
        }
    }
}
