/// Renderer trait - the draw-producing side of a step
///
/// Renderers are registered with a dependency graph as `Weak` references;
/// the render process never keeps one alive. A step whose renderer has been
/// dropped is skipped.

use crate::error::Result;
use crate::graphics_device::{
    ClearValue, CommandBufferHandle, Extent3d, FramebufferHandle, Rect2D, RenderPassHandle,
};
use crate::ids::{RenderPassId, StepId};
use crate::render_process::dependency_graph::Step;
use crate::render_process::depth_pool::DepthImage;

/// Why a renderer is being attached or detached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// First `setup` of the render process
    Setup,
    /// Effective `reset` (resize or gframe count change)
    Reset,
    /// `destroy`
    Destroy,
}

/// Compiled render pass a step of this renderer will draw into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSetupInfo {
    pub step_id: StepId,
    pub render_pass_id: RenderPassId,
    pub render_pass: RenderPassHandle,
    pub extent: Extent3d,
}

/// Everything a renderer needs to record one step for one gframe
///
/// `command_buffer` is the wave's prepare command buffer during
/// `Renderer::prepare` and its draw command buffer during `Renderer::draw`.
/// It is shared by every step of the wave; the caller begins and ends it.
pub struct DrawContext<'a> {
    pub gframe_index: usize,
    pub command_buffer: CommandBufferHandle,
    pub step_id: StepId,
    pub step: &'a Step,
    pub render_pass: RenderPassHandle,
    pub framebuffer: FramebufferHandle,
    pub render_area: Rect2D,
    pub clear_values: &'a [ClearValue],
    /// Pooled depth images of the step, one per pooled-depth subpass
    pub depth_images: &'a [DepthImage],
}

/// Produces the draw commands of one or more steps
///
/// Hooks are invoked once per renderer (not per step) for `attach` and
/// `detach`, and once per step for `prepare_step` and `forget_step`.
pub trait Renderer: Send + Sync {
    /// Debug name
    fn name(&self) -> &str;

    /// Render passes and framebuffers were (re)created
    fn attach(&self, _event: LifecycleEvent, _gframe_count: usize) {}

    /// A step of this renderer has a (new) compiled render pass
    fn prepare_step(&self, _info: &StepSetupInfo) {}

    /// The render pass of a step of this renderer is about to be destroyed
    fn forget_step(&self, _info: &StepSetupInfo) {}

    /// Render passes and framebuffers are about to be destroyed
    fn detach(&self, _event: LifecycleEvent) {}

    /// Record transfers and compute work the step needs before its wave draws
    fn prepare(&self, _ctx: &DrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Record the step described by `ctx`
    fn draw(&self, ctx: &DrawContext<'_>) -> Result<()>;
}
