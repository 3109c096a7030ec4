/// RenderPass - Vulkan implementation of DeviceRenderPass

use ash::vk;
use ash::vk::Handle;
use render_process::rproc::device::{DeviceRenderPass, RenderPassHandle};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan render pass, destroyed when dropped
pub struct RenderPass {
    ctx: Arc<GpuContext>,
    pub(crate) render_pass: vk::RenderPass,
}

impl RenderPass {
    pub(crate) fn new(ctx: Arc<GpuContext>, render_pass: vk::RenderPass) -> Self {
        Self { ctx, render_pass }
    }
}

impl DeviceRenderPass for RenderPass {
    fn handle(&self) -> RenderPassHandle {
        RenderPassHandle(self.render_pass.as_raw())
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
