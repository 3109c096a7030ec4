/// Framebuffer - Vulkan implementation of DeviceFramebuffer
///
/// Wraps a VkFramebuffer grouping the image views of one gframe, in render
/// pass attachment order.

use ash::vk;
use ash::vk::Handle;
use render_process::rproc::device::{DeviceFramebuffer, FramebufferHandle};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan framebuffer, destroyed when dropped
pub struct Framebuffer {
    ctx: Arc<GpuContext>,
    pub(crate) framebuffer: vk::Framebuffer,
    width: u32,
    height: u32,
    layers: u32,
}

impl Framebuffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        framebuffer: vk::Framebuffer,
        width: u32,
        height: u32,
        layers: u32,
    ) -> Self {
        Self { ctx, framebuffer, width, height, layers }
    }
}

impl DeviceFramebuffer for Framebuffer {
    fn handle(&self) -> FramebufferHandle {
        FramebufferHandle(self.framebuffer.as_raw())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn layers(&self) -> u32 {
        self.layers
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
