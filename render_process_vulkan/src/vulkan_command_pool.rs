/// CommandPool - Vulkan implementation of DeviceCommandPool
///
/// The pool is created with RESET_COMMAND_BUFFER on the graphics queue
/// family; its primary command buffers are allocated once and freed together
/// with the pool.

use ash::vk;
use ash::vk::Handle;
use render_process::engine_err;
use render_process::rproc::device::{CommandBufferHandle, CommandPoolHandle, DeviceCommandPool};
use render_process::rproc::Result;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan command pool with its primary command buffers
pub struct CommandPool {
    ctx: Arc<GpuContext>,
    pub(crate) pool: vk::CommandPool,
    buffers: Vec<CommandBufferHandle>,
}

impl CommandPool {
    pub(crate) fn new(ctx: Arc<GpuContext>, pool: vk::CommandPool, buffers: &[vk::CommandBuffer]) -> Self {
        let buffers = buffers.iter().map(|b| CommandBufferHandle(b.as_raw())).collect();
        Self { ctx, pool, buffers }
    }
}

impl DeviceCommandPool for CommandPool {
    fn handle(&self) -> CommandPoolHandle {
        CommandPoolHandle(self.pool.as_raw())
    }

    fn command_buffers(&self) -> &[CommandBufferHandle] {
        &self.buffers
    }

    fn reset(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .reset_command_pool(self.pool, vk::CommandPoolResetFlags::empty())
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to reset command pool: {:?}", e))
        }
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            // Destroying the pool frees its command buffers
            self.ctx.device.destroy_command_pool(self.pool, None);
        }
    }
}
