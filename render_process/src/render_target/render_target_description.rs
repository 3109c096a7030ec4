/// Render target description - what a render target is, before allocation
///
/// A description is either *managed* (the storage allocates one image per
/// gframe) or *external* (the caller supplies one image/view pair per gframe,
/// e.g. swapchain images, and keeps ownership of them).

use std::sync::{Arc, RwLock};

use crate::graphics_device::{
    Extent3d, HostAccessPattern, ImageHandle, ImageUsage, ImageViewHandle, TextureFormat,
};

/// A caller-owned image and its view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalImage {
    pub image: ImageHandle,
    pub view: ImageViewHandle,
}

/// Per-gframe external images, shared with the caller
///
/// The caller updates the list in place (e.g. after recreating a swapchain);
/// the render process re-reads it on every effective reset.
pub type SharedExternalImages = Arc<RwLock<Vec<ExternalImage>>>;

/// Declarative description of a render target
#[derive(Debug, Clone)]
pub struct RenderTargetDescription {
    /// Size; `depth` is the layer count
    pub extent: Extent3d,
    /// Image usage flags
    pub usage: ImageUsage,
    /// Pixel format
    pub format: TextureFormat,
    /// The host reads the target's content
    pub host_readable: bool,
    /// The host writes the target's content
    pub host_writable: bool,
    /// Host access is sequential rather than random
    pub host_access_sequential: bool,
    /// Caller-supplied images; `None` for managed targets
    pub external_images: Option<SharedExternalImages>,
}

impl RenderTargetDescription {
    /// Managed target without host access
    pub fn managed(extent: Extent3d, usage: ImageUsage, format: TextureFormat) -> Self {
        Self {
            extent,
            usage,
            format,
            host_readable: false,
            host_writable: false,
            host_access_sequential: false,
            external_images: None,
        }
    }

    /// External target backed by `images`
    pub fn external(extent: Extent3d, format: TextureFormat, images: SharedExternalImages) -> Self {
        Self {
            extent,
            usage: ImageUsage::COLOR_ATTACHMENT,
            format,
            host_readable: false,
            host_writable: false,
            host_access_sequential: false,
            external_images: Some(images),
        }
    }

    /// Request host access to the target
    pub fn with_host_access(mut self, readable: bool, writable: bool, sequential: bool) -> Self {
        self.host_readable = readable;
        self.host_writable = writable;
        self.host_access_sequential = sequential;
        self
    }

    pub fn with_usage(mut self, usage: ImageUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn is_external(&self) -> bool {
        self.external_images.is_some()
    }

    pub fn requires_host_access(&self) -> bool {
        self.host_readable || self.host_writable
    }

    /// Host access pattern, if the host accesses the target at all
    pub fn host_access(&self) -> Option<HostAccessPattern> {
        if !self.requires_host_access() {
            None
        } else if self.host_access_sequential {
            Some(HostAccessPattern::Sequential)
        } else {
            Some(HostAccessPattern::Random)
        }
    }

    /// Raw byte size of one image: width × height × depth × block size
    pub fn byte_size(&self) -> u64 {
        self.extent.texel_count() * self.format.block_size() as u64
    }
}
