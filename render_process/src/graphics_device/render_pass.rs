/// Native render pass descriptor - describes how to build a render pass object
///
/// This is the flattened, backend-neutral form produced by render pass
/// compilation: one attachment description per attachment reference, in the
/// order framebuffers must supply their image views.

use std::ops::Range;

use bitflags::bitflags;

use crate::graphics_device::TextureFormat;

/// Opaque native render pass handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RenderPassHandle(pub u64);

/// Render pass object; dropping it destroys the native render pass
pub trait DeviceRenderPass: Send + Sync {
    /// Native handle
    fn handle(&self) -> RenderPassHandle;
}

// ===== OPS & LAYOUTS =====

/// Load operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// Load existing content
    Load,
    /// Clear the content
    Clear,
    /// Don't care about existing content
    DontCare,
}

/// Store operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Store the rendered content
    Store,
    /// Don't care about storing the content
    DontCare,
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    /// Undefined layout (initial state)
    Undefined,
    /// Any access, unoptimized
    General,
    /// Layout for color attachment
    ColorAttachment,
    /// Layout for depth/stencil attachment
    DepthStencilAttachment,
    /// Layout for read-only depth/stencil access
    DepthStencilReadOnly,
    /// Layout for shader read-only access
    ShaderReadOnly,
    /// Layout for transfer source
    TransferSrc,
    /// Layout for transfer destination
    TransferDst,
    /// Layout for presenting to swapchain
    PresentSrc,
}

// ===== SYNCHRONIZATION FLAGS =====

bitflags! {
    /// Pipeline stages named by a subpass dependency
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStages: u32 {
        const TOP_OF_PIPE = 1 << 0;
        const VERTEX_SHADER = 1 << 1;
        const FRAGMENT_SHADER = 1 << 2;
        const EARLY_FRAGMENT_TESTS = 1 << 3;
        const LATE_FRAGMENT_TESTS = 1 << 4;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 5;
        const COMPUTE_SHADER = 1 << 6;
        const TRANSFER = 1 << 7;
        const BOTTOM_OF_PIPE = 1 << 8;
    }
}

bitflags! {
    /// Memory accesses named by a subpass dependency
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const INPUT_ATTACHMENT_READ = 1 << 0;
        const SHADER_READ = 1 << 1;
        const SHADER_WRITE = 1 << 2;
        const COLOR_ATTACHMENT_READ = 1 << 3;
        const COLOR_ATTACHMENT_WRITE = 1 << 4;
        const DEPTH_STENCIL_ATTACHMENT_READ = 1 << 5;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 6;
        const TRANSFER_READ = 1 << 7;
        const TRANSFER_WRITE = 1 << 8;
    }
}

bitflags! {
    /// Subpass dependency flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DependencyFlags: u32 {
        const BY_REGION = 1 << 0;
    }
}

/// Source of a subpass dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubpassSource {
    /// Work outside the render pass (previous waves, transfers)
    External,
    /// An earlier subpass of the same render pass
    Subpass(u32),
}

// ===== DESCRIPTORS =====

/// Descriptor for a single attachment in a render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachmentDesc {
    /// Pixel format
    pub format: TextureFormat,
    /// Number of samples (1 = no MSAA)
    pub samples: u32,
    /// Load operation (what to do with existing content)
    pub load_op: LoadOp,
    /// Store operation (what to do with rendered content)
    pub store_op: StoreOp,
    /// Stencil load operation
    pub stencil_load_op: LoadOp,
    /// Stencil store operation
    pub stencil_store_op: StoreOp,
    /// Initial layout (how the attachment starts)
    pub initial_layout: ImageLayout,
    /// Final layout (how the attachment ends)
    pub final_layout: ImageLayout,
}

/// Reference from a subpass to an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Index into `RenderPassDesc::attachments`
    pub attachment: u32,
    /// Layout during the subpass
    pub layout: ImageLayout,
}

/// One subpass, as ranges into `RenderPassDesc::references`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpassDesc {
    pub input_attachments: Range<usize>,
    pub color_attachments: Range<usize>,
    pub depth_attachment: Option<usize>,
}

/// Execution and memory dependency into a subpass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassDependencyDesc {
    pub src_subpass: SubpassSource,
    pub dst_subpass: u32,
    pub src_stage_mask: PipelineStages,
    pub dst_stage_mask: PipelineStages,
    pub src_access_mask: AccessFlags,
    pub dst_access_mask: AccessFlags,
    pub flags: DependencyFlags,
}

/// Descriptor for creating a render pass
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassDesc {
    /// Debug name
    pub name: String,
    /// Attachment descriptions, in framebuffer order
    pub attachments: Vec<AttachmentDesc>,
    /// Attachment references, one per attachment
    pub references: Vec<AttachmentRef>,
    /// Subpasses in execution order
    pub subpasses: Vec<SubpassDesc>,
    /// Subpass dependencies
    pub dependencies: Vec<SubpassDependencyDesc>,
}

// ===== DRAW-TIME VALUES =====

/// Rectangle (render area, scissor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    /// Rectangle at the origin
    pub const fn sized(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}
