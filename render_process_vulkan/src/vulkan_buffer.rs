/// Buffer - Vulkan implementation of DeviceBuffer (host-visible staging buffer)

use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::Allocation;
use render_process::engine_err;
use render_process::rproc::device::{BufferHandle, DeviceBuffer, HostAccessPattern};
use render_process::rproc::Result;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan staging buffer
pub struct Buffer {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    pub(crate) buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
    access: HostAccessPattern,
}

impl Buffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
        access: HostAccessPattern,
    ) -> Self {
        Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            size,
            access,
        }
    }

    fn mapped_range(&self, offset: u64, len: usize) -> Result<*mut u8> {
        let end = offset.saturating_add(len as u64);
        if end > self.size {
            return Err(engine_err!("rproc::vulkan",
                "Buffer access {}..{} out of {} bytes", offset, end, self.size));
        }
        let mapped = self
            .allocation
            .as_ref()
            .and_then(|a| a.mapped_ptr())
            .ok_or_else(|| engine_err!("rproc::vulkan", "Buffer is not CPU-accessible"))?;
        unsafe { Ok((mapped.as_ptr() as *mut u8).add(offset as usize)) }
    }
}

impl DeviceBuffer for Buffer {
    fn handle(&self) -> BufferHandle {
        BufferHandle(self.buffer.as_raw())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn access(&self) -> HostAccessPattern {
        self.access
    }

    /// Copy `data` into the mapped memory at `offset`
    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mapped = self.mapped_range(offset, data.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped, data.len());
        }
        Ok(())
    }

    /// Copy mapped memory at `offset` into `out`
    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        let mapped = self.mapped_range(offset, out.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(mapped as *const u8, out.as_mut_ptr(), out.len());
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
