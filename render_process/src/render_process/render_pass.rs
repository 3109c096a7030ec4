/// Render pass descriptions and their compilation into device objects
///
/// A `RenderPassDescription` lists subpasses that reference render targets
/// by id. Compilation flattens every subpass's attachments into one
/// attachment list (input, then color, then depth, subpass by subpass),
/// creates the native render pass, and one framebuffer per gframe whose
/// image views follow that same order.

use std::ops::Range;

use crate::engine_trace;
use crate::error::Result;
use crate::graphics_device::{
    AccessFlags, AttachmentDesc, AttachmentRef, DependencyFlags, DeviceFramebuffer,
    DeviceRenderPass, Extent3d, FramebufferDesc, FramebufferHandle, GraphicsDevice,
    ImageLayout, ImageViewHandle, LoadOp, PipelineStages, RenderPassDesc, RenderPassHandle,
    StoreOp, SubpassDependencyDesc, SubpassDesc, SubpassSource, TextureFormat,
};
use crate::ids::{RenderPassId, RenderTargetId};
use crate::render_process::depth_pool::DepthPool;
use crate::render_target::RenderTargetStorage;

// ===== DESCRIPTION =====

/// Input or color attachment backed by a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentReference {
    pub rtarget: RenderTargetId,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

impl AttachmentReference {
    pub fn new(
        rtarget: RenderTargetId,
        load_op: LoadOp,
        store_op: StoreOp,
        initial_layout: ImageLayout,
        final_layout: ImageLayout,
    ) -> Self {
        Self { rtarget, load_op, store_op, initial_layout, final_layout }
    }

    /// Cleared and stored color output
    pub fn color(rtarget: RenderTargetId, final_layout: ImageLayout) -> Self {
        Self::new(rtarget, LoadOp::Clear, StoreOp::Store, ImageLayout::Undefined, final_layout)
    }

    /// Loaded input read in a shader
    pub fn input(rtarget: RenderTargetId) -> Self {
        Self::new(
            rtarget,
            LoadOp::Load,
            StoreOp::DontCare,
            ImageLayout::ShaderReadOnly,
            ImageLayout::ShaderReadOnly,
        )
    }
}

/// Depth attachment of a subpass
///
/// With no render target, the image comes from the shared depth pool and
/// uses the process depth format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthAttachment {
    pub rtarget: Option<RenderTargetId>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

impl DepthAttachment {
    /// Transient depth buffer from the pool: cleared, not stored
    pub fn pooled() -> Self {
        Self {
            rtarget: None,
            load_op: LoadOp::Clear,
            store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::DepthStencilAttachment,
        }
    }

    /// Depth buffer backed by a render target: cleared and stored
    pub fn target(rtarget: RenderTargetId) -> Self {
        Self {
            rtarget: Some(rtarget),
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::DepthStencilAttachment,
        }
    }

    pub fn is_pooled(&self) -> bool {
        self.rtarget.is_none()
    }
}

/// Dependency of a subpass on earlier work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassDependency {
    pub src_subpass: SubpassSource,
    pub src_stage_mask: PipelineStages,
    pub dst_stage_mask: PipelineStages,
    pub src_access_mask: AccessFlags,
    pub dst_access_mask: AccessFlags,
    pub flags: DependencyFlags,
}

/// One subpass of a render pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subpass {
    pub input_attachments: Vec<AttachmentReference>,
    pub color_attachments: Vec<AttachmentReference>,
    pub depth_attachment: Option<DepthAttachment>,
    pub dependencies: Vec<SubpassDependency>,
}

impl Subpass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, attachment: AttachmentReference) -> Self {
        self.input_attachments.push(attachment);
        self
    }

    pub fn with_color(mut self, attachment: AttachmentReference) -> Self {
        self.color_attachments.push(attachment);
        self
    }

    pub fn with_depth(mut self, attachment: DepthAttachment) -> Self {
        self.depth_attachment = Some(attachment);
        self
    }

    pub fn with_dependency(mut self, dependency: SubpassDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Whether the subpass draws a depth image from the pool
    pub fn requires_pooled_depth(&self) -> bool {
        self.depth_attachment.is_some_and(|d| d.is_pooled())
    }
}

/// Declarative render pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPassDescription {
    /// Debug name
    pub name: String,
    pub subpasses: Vec<Subpass>,
    /// Framebuffer size; defaults to the first attachment render target's extent
    pub framebuffer_extent: Option<Extent3d>,
}

impl RenderPassDescription {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subpasses: Vec::new(),
            framebuffer_extent: None,
        }
    }

    pub fn with_subpass(mut self, subpass: Subpass) -> Self {
        self.subpasses.push(subpass);
        self
    }

    pub fn with_framebuffer_extent(mut self, extent: Extent3d) -> Self {
        self.framebuffer_extent = Some(extent);
        self
    }

    /// Number of subpasses that need a pooled depth image
    pub fn pooled_depth_count(&self) -> u32 {
        self.subpasses.iter().filter(|s| s.requires_pooled_depth()).count() as u32
    }

    /// Every render target the pass attaches, in attachment order
    pub fn referenced_rtargets(&self) -> impl Iterator<Item = RenderTargetId> + '_ {
        attachment_slots(self).into_iter().filter_map(|slot| match slot.source {
            AttachmentSource::Target(id) => Some(id),
            AttachmentSource::PooledDepth(_) => None,
        })
    }

    pub fn references(&self, rtarget: RenderTargetId) -> bool {
        self.referenced_rtargets().any(|id| id == rtarget)
    }

    /// Framebuffer size given a lookup of render target extents
    pub fn effective_extent(&self, rtarget_extent: impl Fn(RenderTargetId) -> Extent3d) -> Extent3d {
        match self.framebuffer_extent {
            Some(extent) => extent,
            None => self.referenced_rtargets().next().map(rtarget_extent).unwrap_or_default(),
        }
    }
}

// ===== ATTACHMENT WALK =====

/// Where an attachment's image comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttachmentSource {
    Target(RenderTargetId),
    /// The n-th pooled depth image of the pass
    PooledDepth(usize),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AttachmentSlot {
    pub source: AttachmentSource,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

/// Flatten the attachments of `desc` in framebuffer order
pub(crate) fn attachment_slots(desc: &RenderPassDescription) -> Vec<AttachmentSlot> {
    let mut slots = Vec::new();
    let mut pooled = 0;
    for subpass in &desc.subpasses {
        for a in subpass.input_attachments.iter().chain(&subpass.color_attachments) {
            slots.push(AttachmentSlot {
                source: AttachmentSource::Target(a.rtarget),
                load_op: a.load_op,
                store_op: a.store_op,
                initial_layout: a.initial_layout,
                final_layout: a.final_layout,
            });
        }
        if let Some(depth) = &subpass.depth_attachment {
            let source = match depth.rtarget {
                Some(id) => AttachmentSource::Target(id),
                None => {
                    pooled += 1;
                    AttachmentSource::PooledDepth(pooled - 1)
                }
            };
            slots.push(AttachmentSlot {
                source,
                load_op: depth.load_op,
                store_op: depth.store_op,
                initial_layout: depth.initial_layout,
                final_layout: depth.final_layout,
            });
        }
    }
    slots
}

/// Build the native render pass descriptor
pub(crate) fn build_render_pass_desc(
    desc: &RenderPassDescription,
    storage: &RenderTargetStorage,
    depth_format: TextureFormat,
) -> RenderPassDesc {
    let slots = attachment_slots(desc);

    let attachments: Vec<AttachmentDesc> = slots
        .iter()
        .map(|slot| AttachmentDesc {
            format: match slot.source {
                AttachmentSource::Target(id) => storage.description(id).format,
                AttachmentSource::PooledDepth(_) => depth_format,
            },
            samples: 1,
            load_op: slot.load_op,
            store_op: slot.store_op,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: slot.initial_layout,
            final_layout: slot.final_layout,
        })
        .collect();

    let references: Vec<AttachmentRef> = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| AttachmentRef {
            attachment: index as u32,
            layout: slot.final_layout,
        })
        .collect();

    let mut subpasses = Vec::with_capacity(desc.subpasses.len());
    let mut dependencies = Vec::new();
    let mut cursor = 0;
    for (index, subpass) in desc.subpasses.iter().enumerate() {
        let input = span(&mut cursor, subpass.input_attachments.len());
        let color = span(&mut cursor, subpass.color_attachments.len());
        let depth = subpass.depth_attachment.map(|_| span(&mut cursor, 1).start);
        subpasses.push(SubpassDesc {
            input_attachments: input,
            color_attachments: color,
            depth_attachment: depth,
        });

        dependencies.extend(subpass.dependencies.iter().map(|dep| SubpassDependencyDesc {
            src_subpass: dep.src_subpass,
            dst_subpass: index as u32,
            src_stage_mask: dep.src_stage_mask,
            dst_stage_mask: dep.dst_stage_mask,
            src_access_mask: dep.src_access_mask,
            dst_access_mask: dep.dst_access_mask,
            flags: dep.flags,
        }));
    }

    RenderPassDesc {
        name: desc.name.clone(),
        attachments,
        references,
        subpasses,
        dependencies,
    }
}

fn span(cursor: &mut usize, len: usize) -> Range<usize> {
    let start = *cursor;
    *cursor += len;
    start..*cursor
}

// ===== COMPILED RENDER PASS =====

/// What a render pass is compiled against
pub(crate) struct RenderPassInputs<'a> {
    pub storage: &'a RenderTargetStorage,
    pub depth_pool: &'a DepthPool,
    /// First pool slot of the pass's pooled depth images
    pub depth_base: Option<usize>,
    pub depth_format: TextureFormat,
}

/// Compiled render pass: native render pass and one framebuffer per gframe
pub struct RenderPass {
    // Framebuffers are dropped before the render pass they were made for.
    framebuffers: Vec<Box<dyn DeviceFramebuffer>>,
    handle: Box<dyn DeviceRenderPass>,
    extent: Extent3d,
}

impl RenderPass {
    pub(crate) fn compile(
        device: &dyn GraphicsDevice,
        id: RenderPassId,
        desc: &RenderPassDescription,
        inputs: &RenderPassInputs<'_>,
    ) -> Result<Self> {
        let storage = inputs.storage;
        let native = build_render_pass_desc(desc, storage, inputs.depth_format);
        let extent = desc.effective_extent(|rt| storage.description(rt).extent);

        engine_trace!("rproc::RenderPass",
            "Compiling {} '{}': {} subpass(es), {} attachment(s), {}x{}x{}",
            id, desc.name, native.subpasses.len(), native.attachments.len(),
            extent.width, extent.height, extent.depth);

        let handle = device.create_render_pass(&native)?;

        let slots = attachment_slots(desc);
        let gframe_count = storage.gframe_count();
        let mut framebuffers = Vec::with_capacity(gframe_count);
        let mut views = Vec::with_capacity(slots.len());
        for gframe in 0..gframe_count {
            views.clear();
            views.extend(slots.iter().map(|slot| slot_view(slot, gframe, inputs)));

            let created = device.create_framebuffer(&FramebufferDesc {
                render_pass: handle.as_ref(),
                attachments: &views,
                width: extent.width,
                height: extent.height,
                layers: extent.depth.max(1),
            });
            match created {
                Ok(framebuffer) => framebuffers.push(framebuffer),
                Err(e) => {
                    drop(framebuffers);
                    drop(handle);
                    return Err(e);
                }
            }
        }

        Ok(Self { framebuffers, handle, extent })
    }

    /// Native render pass handle
    pub fn handle(&self) -> RenderPassHandle {
        self.handle.handle()
    }

    /// Framebuffer of `gframe`
    pub fn framebuffer(&self, gframe: usize) -> Option<FramebufferHandle> {
        self.framebuffers.get(gframe).map(|fb| fb.handle())
    }

    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Framebuffer size; `depth` is the layer count
    pub fn extent(&self) -> Extent3d {
        self.extent
    }
}

fn slot_view(slot: &AttachmentSlot, gframe: usize, inputs: &RenderPassInputs<'_>) -> ImageViewHandle {
    match slot.source {
        AttachmentSource::Target(id) => inputs.storage.entry_set(id).view(gframe),
        AttachmentSource::PooledDepth(n) => {
            debug_assert!(inputs.depth_base.is_some(), "pooled depth without a pool slot");
            inputs.depth_pool.view(gframe, inputs.depth_base.unwrap_or(0) + n)
        }
    }
}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
