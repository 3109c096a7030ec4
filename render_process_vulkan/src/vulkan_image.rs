/// Image and ImageView - Vulkan implementations of DeviceImage / DeviceImageView

use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::Allocation;
use render_process::rproc::device::{DeviceImage, DeviceImageView, ImageHandle, ImageInfo, ImageViewHandle};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan image with its memory
pub struct Image {
    ctx: Arc<GpuContext>,
    pub(crate) image: vk::Image,
    allocation: Option<Allocation>,
    info: ImageInfo,
}

impl Image {
    pub(crate) fn new(ctx: Arc<GpuContext>, image: vk::Image, allocation: Allocation, info: ImageInfo) -> Self {
        Self {
            ctx,
            image,
            allocation: Some(allocation),
            info,
        }
    }
}

impl DeviceImage for Image {
    fn handle(&self) -> ImageHandle {
        ImageHandle(self.image.as_raw())
    }

    fn info(&self) -> &ImageInfo {
        &self.info
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the image
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_image(self.image, None);
        }
    }
}

/// Vulkan image view
pub struct ImageView {
    ctx: Arc<GpuContext>,
    pub(crate) view: vk::ImageView,
}

impl ImageView {
    pub(crate) fn new(ctx: Arc<GpuContext>, view: vk::ImageView) -> Self {
        Self { ctx, view }
    }
}

impl DeviceImageView for ImageView {
    fn handle(&self) -> ImageViewHandle {
        ImageViewHandle(self.view.as_raw())
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.view, None);
        }
    }
}
