/// Fence and Semaphore - Vulkan implementations of DeviceFence and DeviceSemaphore

use ash::vk;
use ash::vk::Handle;
use render_process::engine_err;
use render_process::rproc::device::{DeviceFence, DeviceSemaphore, FenceHandle, SemaphoreHandle};
use render_process::rproc::Result;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan fence, destroyed when dropped
pub struct Fence {
    ctx: Arc<GpuContext>,
    pub(crate) fence: vk::Fence,
}

impl Fence {
    pub(crate) fn new(ctx: Arc<GpuContext>, fence: vk::Fence) -> Self {
        Self { ctx, fence }
    }
}

impl DeviceFence for Fence {
    fn handle(&self) -> FenceHandle {
        FenceHandle(self.fence.as_raw())
    }

    fn wait(&self, timeout_ns: u64) -> Result<bool> {
        unsafe {
            match self.ctx.device.wait_for_fences(&[self.fence], true, timeout_ns) {
                Ok(()) => Ok(true),
                Err(vk::Result::TIMEOUT) => Ok(false),
                Err(e) => Err(engine_err!("rproc::vulkan", "Failed to wait for fence: {:?}", e)),
            }
        }
    }

    fn reset(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .reset_fences(&[self.fence])
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to reset fence: {:?}", e))
        }
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_fence(self.fence, None);
        }
    }
}

/// Vulkan binary semaphore, destroyed when dropped
pub struct Semaphore {
    ctx: Arc<GpuContext>,
    pub(crate) semaphore: vk::Semaphore,
}

impl Semaphore {
    pub(crate) fn new(ctx: Arc<GpuContext>, semaphore: vk::Semaphore) -> Self {
        Self { ctx, semaphore }
    }
}

impl DeviceSemaphore for Semaphore {
    fn handle(&self) -> SemaphoreHandle {
        SemaphoreHandle(self.semaphore.as_raw())
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_semaphore(self.semaphore, None);
        }
    }
}
