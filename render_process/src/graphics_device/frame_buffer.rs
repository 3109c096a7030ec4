/// Framebuffer trait - binds image views to a render pass
///
/// Attachments are listed in exactly the order of the render pass's
/// attachment descriptions; nothing re-checks this at draw time.

use crate::graphics_device::{DeviceRenderPass, ImageViewHandle};

/// Opaque native framebuffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FramebufferHandle(pub u64);

/// Framebuffer; dropping it destroys the native framebuffer
pub trait DeviceFramebuffer: Send + Sync {
    /// Native handle
    fn handle(&self) -> FramebufferHandle;

    /// Get the width in pixels
    fn width(&self) -> u32;

    /// Get the height in pixels
    fn height(&self) -> u32;

    /// Get the layer count
    fn layers(&self) -> u32;
}

/// Descriptor for creating a framebuffer
pub struct FramebufferDesc<'a> {
    /// The render pass this framebuffer is compatible with
    pub render_pass: &'a dyn DeviceRenderPass,
    /// Image views, in render pass attachment order
    pub attachments: &'a [ImageViewHandle],
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Layer count
    pub layers: u32,
}
