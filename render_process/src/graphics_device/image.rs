/// Image and image view traits, descriptors and the format/usage vocabulary
///
/// Images are created through `GraphicsDevice::create_image()` and release
/// their memory when dropped. Raw handles (`ImageHandle`, `ImageViewHandle`)
/// identify native objects without owning them, which is how external images
/// (e.g. swapchain images) enter the render process.

use bitflags::bitflags;

// ===== HANDLES =====

/// Opaque native image handle (e.g. a `VkImage` as `u64`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ImageHandle(pub u64);

/// Opaque native image view handle (e.g. a `VkImageView` as `u64`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ImageViewHandle(pub u64);

// ===== EXTENT =====

/// Three-dimensional size in texels
///
/// `depth` is the number of layers for 2D attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3d {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent3d {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }

    /// Single-layer 2D extent
    pub const fn flat(width: u32, height: u32) -> Self {
        Self { width, height, depth: 1 }
    }

    /// Component-wise maximum
    pub fn max(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
            depth: self.depth.max(other.depth),
        }
    }

    /// Whether every component is zero
    pub fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0 && self.depth == 0
    }

    /// width × height × depth
    pub fn texel_count(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }
}

// ===== FORMAT =====

/// Pixel format of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
    R32_SFLOAT,
    R32G32B32A32_SFLOAT,
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
    D32_FLOAT_S8_UINT,
}

impl TextureFormat {
    /// Size in bytes of one texel block
    pub fn block_size(self) -> u32 {
        match self {
            TextureFormat::R8_UNORM => 1,
            TextureFormat::D16_UNORM => 2,
            TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::B8G8R8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::R32_SFLOAT
            | TextureFormat::D32_FLOAT
            | TextureFormat::D24_UNORM_S8_UINT => 4,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            // 32-bit depth + 8-bit stencil, padded
            TextureFormat::D32_FLOAT_S8_UINT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
        }
    }

    /// Whether the format has a depth component
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_FLOAT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_FLOAT_S8_UINT
        )
    }

    /// Whether the format has a stencil component
    pub fn has_stencil(self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8_UINT)
    }

    /// Aspects a full view of this format covers
    pub fn aspect(self) -> ImageAspect {
        if self.has_stencil() {
            ImageAspect::DEPTH | ImageAspect::STENCIL
        } else if self.is_depth() {
            ImageAspect::DEPTH
        } else {
            ImageAspect::COLOR
        }
    }
}

// ===== FLAGS =====

bitflags! {
    /// How an image may be used
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const TRANSFER_SRC = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        const SAMPLED = 1 << 2;
        const STORAGE = 1 << 3;
        const COLOR_ATTACHMENT = 1 << 4;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 5;
        const INPUT_ATTACHMENT = 1 << 6;
    }
}

bitflags! {
    /// Image aspects covered by a view
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageAspect: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

// ===== IMAGE =====

/// Host access pattern for memory the CPU maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostAccessPattern {
    /// Written front to back (uploads)
    Sequential,
    /// Read or written at arbitrary offsets (readbacks)
    Random,
}

/// Descriptor for creating an image
#[derive(Debug, Clone)]
pub struct ImageDesc<'a> {
    /// Debug name
    pub name: &'a str,
    /// Size; `depth` is the layer count
    pub extent: Extent3d,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: ImageUsage,
    /// Host access the caller intends, if any (the backend may then prefer
    /// host-visible memory, but is not required to)
    pub host_access: Option<HostAccessPattern>,
}

/// Read-only properties of a created image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub extent: Extent3d,
    pub format: TextureFormat,
    pub usage: ImageUsage,
    /// Whether the image memory is directly mappable by the host
    pub host_visible: bool,
}

/// Image owned by the caller; dropping it releases the native image and its memory
pub trait DeviceImage: Send + Sync {
    /// Native handle
    fn handle(&self) -> ImageHandle;

    /// Image properties
    fn info(&self) -> &ImageInfo;
}

// ===== IMAGE VIEW =====

/// Descriptor for creating an image view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageViewDesc {
    pub format: TextureFormat,
    pub aspect: ImageAspect,
    /// Number of array layers the view covers, starting at 0
    pub layer_count: u32,
}

impl ImageViewDesc {
    /// View covering every layer and aspect of an image
    pub fn full(info: &ImageInfo) -> Self {
        Self {
            format: info.format,
            aspect: info.format.aspect(),
            layer_count: info.extent.depth.max(1),
        }
    }
}

/// Image view owned by the caller; dropping it destroys the native view
pub trait DeviceImageView: Send + Sync {
    /// Native handle
    fn handle(&self) -> ImageViewHandle;
}
