/// Shared depth image pool
///
/// Subpasses with a pooled depth attachment draw their images from one pool
/// instead of owning them. Each render pass gets a contiguous range of pool
/// slots; two render passes that run in the same wave never share a slot,
/// render passes in different waves may.

use std::ops::Range;

use rustc_hash::FxHashSet;

use crate::engine_debug;
use crate::error::Result;
use crate::graphics_device::{
    DeviceImage, DeviceImageView, Extent3d, GraphicsDevice, ImageDesc, ImageHandle,
    ImageUsage, ImageViewDesc, ImageViewHandle, TextureFormat,
};
use crate::ids::{RenderPassId, StepId};
use crate::render_process::dependency_graph::Step;

// ===== SLOT PLAN =====

/// Assignment of pool slots to render passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthSlotPlan {
    pool_size: usize,
    rpass_base: Vec<Option<usize>>,
}

impl DepthSlotPlan {
    /// Plan slots for `steps` (sorted by wave)
    ///
    /// `rpass_depth_counts[i]` is the pooled depth image count of render pass
    /// `i`. Render passes are placed greedily in order of first use, each at
    /// the lowest base whose range overlaps no render pass it shares a wave
    /// with. The pool is never smaller than `min_size`.
    pub fn plan(steps: &[(StepId, Step)], rpass_depth_counts: &[u32], min_size: usize) -> Self {
        let count = |rpass: usize| rpass_depth_counts.get(rpass).copied().unwrap_or(0) as usize;

        let mut order: Vec<usize> = Vec::new();
        let mut seen = FxHashSet::default();
        let mut conflicts: FxHashSet<(usize, usize)> = FxHashSet::default();

        for wave in steps.chunk_by(|a, b| a.1.sequence_index == b.1.sequence_index) {
            let mut in_wave: Vec<usize> = wave
                .iter()
                .filter_map(|(_, step)| step.render_pass.map(RenderPassId::index))
                .filter(|&rpass| count(rpass) > 0)
                .collect();
            in_wave.sort_unstable();
            in_wave.dedup();

            for (i, &a) in in_wave.iter().enumerate() {
                if seen.insert(a) {
                    order.push(a);
                }
                for &b in &in_wave[i + 1..] {
                    conflicts.insert((a, b));
                    conflicts.insert((b, a));
                }
            }
        }
        // Passes no step uses are still compiled and need slots of their own.
        for rpass in 0..rpass_depth_counts.len() {
            if count(rpass) > 0 && seen.insert(rpass) {
                order.push(rpass);
            }
        }

        let mut rpass_base = vec![None; rpass_depth_counts.len()];
        let mut pool_size = min_size;
        for &rpass in &order {
            let len = count(rpass);
            let mut base = 0;
            while let Some(end) = order
                .iter()
                .filter(|&&other| conflicts.contains(&(rpass, other)))
                .filter_map(|&other| rpass_base[other].map(|b| (b, b + count(other))))
                .find(|&(start, end)| start < base + len && base < end)
                .map(|(_, end)| end)
            {
                base = end;
            }
            rpass_base[rpass] = Some(base);
            pool_size = pool_size.max(base + len);
        }

        Self { pool_size, rpass_base }
    }

    /// Number of depth images per gframe
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// First slot of the pooled depth images of `rpass`
    pub fn base(&self, rpass: RenderPassId) -> Option<usize> {
        self.rpass_base.get(rpass.index()).copied().flatten()
    }

    /// Slot range of `rpass`, given its pooled depth image count
    pub fn range(&self, rpass: RenderPassId, count: u32) -> Range<usize> {
        match self.base(rpass) {
            Some(base) => base..base + count as usize,
            None => 0..0,
        }
    }
}

// ===== POOL =====

/// One pooled depth image and its view
pub struct DepthImage {
    // Field order is drop order: view before image.
    view: Box<dyn DeviceImageView>,
    image: Box<dyn DeviceImage>,
}

impl DepthImage {
    pub fn image(&self) -> ImageHandle {
        self.image.handle()
    }

    pub fn view(&self) -> ImageViewHandle {
        self.view.handle()
    }

    pub fn extent(&self) -> Extent3d {
        self.image.info().extent
    }
}

/// `size` depth images per gframe, stored gframe-major
#[derive(Default)]
pub struct DepthPool {
    images: Vec<DepthImage>,
    size: usize,
    gframe_count: usize,
    extent: Extent3d,
    format: Option<TextureFormat>,
}

impl DepthPool {
    /// Pool holding no image
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn allocate(
        device: &dyn GraphicsDevice,
        format: TextureFormat,
        extent: Extent3d,
        size: usize,
        gframe_count: usize,
    ) -> Result<Self> {
        if size == 0 || extent.texel_count() == 0 {
            return Ok(Self { format: Some(format), extent, ..Self::default() });
        }

        let mut images = Vec::with_capacity(size * gframe_count);
        for gframe in 0..gframe_count {
            for slot in 0..size {
                let name = format!("depth[{}][{}]", gframe, slot);
                let image = device.create_image(&ImageDesc {
                    name: &name,
                    extent,
                    format,
                    usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
                    host_access: None,
                })?;
                let view = device.create_image_view(image.as_ref(), &ImageViewDesc::full(image.info()))?;
                images.push(DepthImage { view, image });
            }
        }

        engine_debug!("rproc::DepthPool",
            "Allocated {} depth image(s) per gframe ({} gframe(s), {}x{}x{}, {:?})",
            size, gframe_count, extent.width, extent.height, extent.depth, format);

        Ok(Self { images, size, gframe_count, extent, format: Some(format) })
    }

    /// Images per gframe
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn gframe_count(&self) -> usize {
        self.gframe_count
    }

    pub fn extent(&self) -> Extent3d {
        self.extent
    }

    pub fn format(&self) -> Option<TextureFormat> {
        self.format
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// View of `slot` for `gframe`
    pub fn view(&self, gframe: usize, slot: usize) -> ImageViewHandle {
        debug_assert!(slot < self.size, "depth slot {} out of {}", slot, self.size);
        self.images[gframe * self.size + slot].view()
    }

    /// Images of `slots` for `gframe`
    pub fn images(&self, gframe: usize, slots: Range<usize>) -> &[DepthImage] {
        if slots.is_empty() {
            return &[];
        }
        let offset = gframe * self.size;
        self.images
            .get(offset + slots.start..offset + slots.end)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
#[path = "depth_pool_tests.rs"]
mod tests;
