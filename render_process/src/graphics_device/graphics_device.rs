/// GraphicsDevice trait - factory for every GPU object the render process owns
///
/// Implemented by backends (Vulkan) and by the test mock. All created objects
/// are returned boxed and release their native resource when dropped, so the
/// render process expresses destruction order through ownership alone.

use crate::error::Result;
use crate::graphics_device::{
    CommandPoolDesc, DeviceBuffer, DeviceCommandPool, DeviceFence, DeviceFramebuffer, DeviceImage,
    DeviceImageView, DeviceRenderPass, DeviceSemaphore, FramebufferDesc, ImageDesc, ImageViewDesc,
    RenderPassDesc, StagingBufferDesc,
};

/// Graphics device
///
/// Creation failures are reported as errors; a failed call must not leak
/// any partially-created native object.
pub trait GraphicsDevice: Send + Sync {
    /// Create a device image and bind memory to it
    fn create_image(&self, desc: &ImageDesc) -> Result<Box<dyn DeviceImage>>;

    /// Create a view over `image`
    fn create_image_view(
        &self,
        image: &dyn DeviceImage,
        desc: &ImageViewDesc,
    ) -> Result<Box<dyn DeviceImageView>>;

    /// Create a host-visible staging buffer
    fn create_staging_buffer(&self, desc: &StagingBufferDesc) -> Result<Box<dyn DeviceBuffer>>;

    /// Create a render pass object
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Box<dyn DeviceRenderPass>>;

    /// Create a framebuffer compatible with `desc.render_pass`
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Box<dyn DeviceFramebuffer>>;

    /// Create a command pool on the graphics queue family, with its command buffers
    fn create_command_pool(&self, desc: &CommandPoolDesc) -> Result<Box<dyn DeviceCommandPool>>;

    /// Create a fence, optionally already signaled
    fn create_fence(&self, signaled: bool) -> Result<Box<dyn DeviceFence>>;

    fn create_semaphore(&self) -> Result<Box<dyn DeviceSemaphore>>;

    /// Block until the device has finished all submitted work
    fn wait_idle(&self) -> Result<()>;
}
