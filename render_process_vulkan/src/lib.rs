/*!
# Render Process - Vulkan Backend

Vulkan implementation of the `GraphicsDevice` trait consumed by the
`render_process` crate.

Images, views, staging buffers, render passes, framebuffers, command pools
and sync primitives are created with the Ash bindings; memory comes from
gpu-allocator. A device is either
headless (it owns its instance, used for offscreen processes and tests) or
wraps a device the application already created.

```no_run
use std::sync::Arc;
use render_process::rproc::device::GraphicsDevice;
use render_process_vulkan::{VulkanDeviceConfig, VulkanGraphicsDevice};

let device: Arc<dyn GraphicsDevice> =
    Arc::new(VulkanGraphicsDevice::new_headless(VulkanDeviceConfig::default())?);
# Ok::<(), render_process::rproc::Error>(())
```
*/

mod vulkan_context;
mod vulkan_graphics_device;
mod vulkan_image;
mod vulkan_buffer;
mod vulkan_command_pool;
mod vulkan_sync;
mod vulkan_render_pass;
mod vulkan_frame_buffer;
mod vulkan_format;
mod vulkan_debug;

pub use vulkan_context::GpuContext;
pub use vulkan_graphics_device::{VulkanDeviceConfig, VulkanGraphicsDevice};
pub use vulkan_buffer::Buffer;

// Re-export debug utilities
pub use vulkan_debug::{get_validation_stats, ValidationStats};
