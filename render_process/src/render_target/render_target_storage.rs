/// Render target storage - per-gframe images backing every declared render target
///
/// Entries are stored flat, `gframe_count` consecutive entries per target, so
/// gframe `g` of target `t` lives at `entries[t.index() * gframe_count + g]`.
///
/// A managed entry owns its image, optional staging buffer and view; dropping
/// the entry destroys them. An external entry only records caller-owned
/// handles and never destroys anything.

use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};
use crate::graphics_device::{
    DeviceBuffer, DeviceImage, DeviceImageView, Extent3d, GraphicsDevice, ImageDesc,
    ImageHandle, ImageViewDesc, ImageViewHandle, StagingBufferDesc, TextureFormat,
};
use crate::ids::RenderTargetId;
use crate::render_target::{ExternalImage, RenderTargetDescription};
use crate::{engine_bail, engine_debug, engine_error, engine_trace};

// ===== ENTRIES =====

/// Handles of a caller-owned image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalRenderTarget {
    pub image: ImageHandle,
    pub view: ImageViewHandle,
    pub extent: Extent3d,
    pub format: TextureFormat,
}

/// Image, optional staging buffer and view owned by the storage
pub struct ManagedRenderTarget {
    // Declaration order is drop order: view, then staging buffer, then image.
    view: Box<dyn DeviceImageView>,
    staging_buffer: Option<Box<dyn DeviceBuffer>>,
    image: Box<dyn DeviceImage>,
}

impl ManagedRenderTarget {
    /// Create the image, the staging buffer if needed, then the view
    ///
    /// If a later sub-resource fails, the earlier ones are dropped (destroyed)
    /// before the error is returned.
    pub(crate) fn create(
        device: &dyn GraphicsDevice,
        desc: &RenderTargetDescription,
        name: &str,
    ) -> Result<Self> {
        let host_access = desc.host_access();
        let image = device.create_image(&ImageDesc {
            name,
            extent: desc.extent,
            format: desc.format,
            usage: desc.usage,
            host_access,
        })?;

        let staging_buffer = match host_access {
            Some(access) if !image.info().host_visible => {
                Some(device.create_staging_buffer(&StagingBufferDesc {
                    name,
                    size: desc.byte_size(),
                    access,
                    host_readable: desc.host_readable,
                    host_writable: desc.host_writable,
                })?)
            }
            _ => None,
        };

        let view = device.create_image_view(image.as_ref(), &ImageViewDesc::full(image.info()))?;

        Ok(Self { view, staging_buffer, image })
    }

    pub fn image(&self) -> &dyn DeviceImage {
        self.image.as_ref()
    }

    pub fn view(&self) -> &dyn DeviceImageView {
        self.view.as_ref()
    }

    pub fn staging_buffer(&self) -> Option<&dyn DeviceBuffer> {
        self.staging_buffer.as_deref()
    }
}

impl fmt::Debug for ManagedRenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedRenderTarget")
            .field("image", &self.image.handle())
            .field("view", &self.view.handle())
            .field("staging_buffer", &self.staging_buffer.as_ref().map(|b| b.handle()))
            .field("info", self.image.info())
            .finish()
    }
}

/// One gframe instance of a render target
#[derive(Debug)]
pub enum RenderTarget {
    /// Caller-owned image, never destroyed here
    Reference(ExternalRenderTarget),
    /// Image owned by the storage
    Managed(ManagedRenderTarget),
}

impl RenderTarget {
    pub fn is_external(&self) -> bool {
        matches!(self, RenderTarget::Reference(_))
    }

    pub fn image(&self) -> ImageHandle {
        match self {
            RenderTarget::Reference(r) => r.image,
            RenderTarget::Managed(m) => m.image.handle(),
        }
    }

    pub fn view(&self) -> ImageViewHandle {
        match self {
            RenderTarget::Reference(r) => r.view,
            RenderTarget::Managed(m) => m.view.handle(),
        }
    }

    pub fn extent(&self) -> Extent3d {
        match self {
            RenderTarget::Reference(r) => r.extent,
            RenderTarget::Managed(m) => m.image.info().extent,
        }
    }

    pub fn format(&self) -> TextureFormat {
        match self {
            RenderTarget::Reference(r) => r.format,
            RenderTarget::Managed(m) => m.image.info().format,
        }
    }

    /// Staging buffer, for managed host-accessible targets whose image is not host-visible
    pub fn staging_buffer(&self) -> Option<&dyn DeviceBuffer> {
        match self {
            RenderTarget::Reference(_) => None,
            RenderTarget::Managed(m) => m.staging_buffer(),
        }
    }
}

// ===== ENTRY SET =====

/// The `gframe_count` entries of one render target
#[derive(Debug, Clone, Copy)]
pub struct EntrySet<'a> {
    entries: &'a [RenderTarget],
    external: bool,
}

impl<'a> EntrySet<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    pub fn get(&self, gframe: usize) -> Option<&'a RenderTarget> {
        self.entries.get(gframe)
    }

    pub fn iter(&self) -> std::slice::Iter<'a, RenderTarget> {
        self.entries.iter()
    }

    pub fn image(&self, gframe: usize) -> ImageHandle {
        self.entries[gframe].image()
    }

    pub fn view(&self, gframe: usize) -> ImageViewHandle {
        self.entries[gframe].view()
    }

    pub fn extent(&self, gframe: usize) -> Extent3d {
        self.entries[gframe].extent()
    }

    pub fn format(&self, gframe: usize) -> TextureFormat {
        self.entries[gframe].format()
    }
}

impl<'a> Index<usize> for EntrySet<'a> {
    type Output = RenderTarget;

    fn index(&self, gframe: usize) -> &RenderTarget {
        &self.entries[gframe]
    }
}

// ===== FACTORY =====

/// Accumulates render target descriptions until allocation
#[derive(Debug, Clone, Default)]
pub struct RenderTargetStorageFactory {
    descriptions: Vec<RenderTargetDescription>,
}

impl RenderTargetStorageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a render target
    pub fn set_render_target(&mut self, desc: RenderTargetDescription) -> RenderTargetId {
        let id = RenderTargetId::from_index(self.descriptions.len());
        self.descriptions.push(desc);
        id
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    pub fn description(&self, id: RenderTargetId) -> Option<&RenderTargetDescription> {
        self.descriptions.get(id.index())
    }

    pub fn descriptions(&self) -> &[RenderTargetDescription] {
        &self.descriptions
    }

    /// Allocate every declared render target for `gframe_count` gframes
    ///
    /// Targets are built in declaration order; the first failure stops
    /// construction and everything built so far is dropped.
    pub fn finalize(
        self,
        device: &dyn GraphicsDevice,
        gframe_count: usize,
    ) -> Result<RenderTargetStorage> {
        if gframe_count == 0 {
            engine_bail!("rproc::RenderTargetStorage", "Cannot finalize render targets for 0 gframes");
        }

        let mut entries = Vec::with_capacity(self.descriptions.len() * gframe_count);
        for (index, desc) in self.descriptions.iter().enumerate() {
            let id = RenderTargetId::from_index(index);
            if desc.is_external() {
                entries.extend(external_entries(id, desc, gframe_count)?);
            } else {
                for gframe in 0..gframe_count {
                    let name = entry_name(id, gframe);
                    entries.push(RenderTarget::Managed(ManagedRenderTarget::create(device, desc, &name)?));
                }
            }
        }

        engine_debug!("rproc::RenderTargetStorage",
            "Finalized {} render target(s), {} entries for {} gframe(s)",
            self.descriptions.len(), entries.len(), gframe_count);

        Ok(RenderTargetStorage {
            entries,
            descriptions: self.descriptions,
            gframe_count,
        })
    }
}

fn entry_name(id: RenderTargetId, gframe: usize) -> String {
    format!("{}[{}]", id, gframe)
}

/// Read the shared image list of an external target
fn external_entries(
    id: RenderTargetId,
    desc: &RenderTargetDescription,
    gframe_count: usize,
) -> Result<Vec<RenderTarget>> {
    let images: Vec<ExternalImage> = match &desc.external_images {
        Some(shared) => shared
            .read()
            .map_err(|_| Error::InvalidResource(format!("{}: external image list is poisoned", id)))?
            .clone(),
        None => Vec::new(),
    };

    if images.len() != gframe_count {
        engine_error!("rproc::RenderTargetStorage",
            "{} supplies {} external image(s), {} gframe(s) required",
            id, images.len(), gframe_count);
        return Err(Error::InvalidResource(format!(
            "{}: expected {} external images, got {}", id, gframe_count, images.len()
        )));
    }

    Ok(images
        .into_iter()
        .map(|img| RenderTarget::Reference(ExternalRenderTarget {
            image: img.image,
            view: img.view,
            extent: desc.extent,
            format: desc.format,
        }))
        .collect())
}

// ===== STORAGE =====

/// Allocated render targets
pub struct RenderTargetStorage {
    entries: Vec<RenderTarget>,
    descriptions: Vec<RenderTargetDescription>,
    gframe_count: usize,
}

impl RenderTargetStorage {
    pub fn gframe_count(&self) -> usize {
        self.gframe_count
    }

    /// Number of render targets
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    pub fn description(&self, id: RenderTargetId) -> &RenderTargetDescription {
        debug_assert!(id.index() < self.descriptions.len(), "unregistered {}", id);
        &self.descriptions[id.index()]
    }

    pub fn descriptions(&self) -> &[RenderTargetDescription] {
        &self.descriptions
    }

    /// The per-gframe entries of `id`
    pub fn entry_set(&self, id: RenderTargetId) -> EntrySet<'_> {
        debug_assert!(id.index() < self.descriptions.len(), "unregistered {}", id);
        let offset = id.index() * self.gframe_count;
        EntrySet {
            entries: self.entries.get(offset..offset + self.gframe_count).unwrap_or(&[]),
            external: self.descriptions[id.index()].is_external(),
        }
    }

    pub fn entry(&self, id: RenderTargetId, gframe: usize) -> Option<&RenderTarget> {
        self.entry_set(id).get(gframe)
    }

    /// Change the declared extent of `id`
    ///
    /// Only the description changes; returns whether it actually did. The
    /// entries are rebuilt by `recreate_entries`.
    pub fn set_rtarget_extent(&mut self, id: RenderTargetId, extent: Extent3d) -> bool {
        debug_assert!(id.index() < self.descriptions.len(), "unregistered {}", id);
        let desc = &mut self.descriptions[id.index()];
        if desc.extent == extent {
            return false;
        }
        engine_trace!("rproc::RenderTargetStorage",
            "{} extent {:?} -> {:?}", id, desc.extent, extent);
        desc.extent = extent;
        true
    }

    /// Rebuild the entries of `id` from its current description
    ///
    /// Each new entry is fully created before it replaces the old one.
    pub fn recreate_entries(&mut self, device: &dyn GraphicsDevice, id: RenderTargetId) -> Result<()> {
        let desc = self.description(id).clone();
        let offset = id.index() * self.gframe_count;

        if desc.is_external() {
            for (gframe, entry) in external_entries(id, &desc, self.gframe_count)?.into_iter().enumerate() {
                self.entries[offset + gframe] = entry;
            }
            return Ok(());
        }

        for gframe in 0..self.gframe_count {
            let fresh = ManagedRenderTarget::create(device, &desc, &entry_name(id, gframe))?;
            self.entries[offset + gframe] = RenderTarget::Managed(fresh);
        }
        Ok(())
    }

    /// Change the number of gframes
    ///
    /// Existing managed entries are kept up to the new count; missing ones
    /// are created and surplus ones destroyed. External targets are re-read
    /// from their shared image lists, which must already hold `gframe_count`
    /// images. On failure the storage is left empty.
    pub fn set_gframe_count(&mut self, device: &dyn GraphicsDevice, gframe_count: usize) -> Result<()> {
        if gframe_count == 0 {
            engine_bail!("rproc::RenderTargetStorage", "Cannot resize render targets to 0 gframes");
        }
        if gframe_count == self.gframe_count {
            return Ok(());
        }

        let old_count = self.gframe_count;
        let mut old_entries = std::mem::take(&mut self.entries).into_iter();
        self.gframe_count = 0;

        let mut entries = Vec::with_capacity(self.descriptions.len() * gframe_count);
        for (index, desc) in self.descriptions.iter().enumerate() {
            let id = RenderTargetId::from_index(index);
            let mut kept: Vec<RenderTarget> = old_entries.by_ref().take(old_count).collect();

            if desc.is_external() {
                drop(kept);
                entries.extend(external_entries(id, desc, gframe_count)?);
                continue;
            }

            kept.truncate(gframe_count);
            entries.extend(kept);
            for gframe in old_count..gframe_count {
                entries.push(RenderTarget::Managed(ManagedRenderTarget::create(
                    device, desc, &entry_name(id, gframe),
                )?));
            }
        }

        engine_debug!("rproc::RenderTargetStorage",
            "Gframe count {} -> {} ({} entries)", old_count, gframe_count, entries.len());

        self.entries = entries;
        self.gframe_count = gframe_count;
        Ok(())
    }

    /// Re-read the shared image lists of every external target
    pub fn update_external_references(&mut self) -> Result<()> {
        for index in 0..self.descriptions.len() {
            let desc = &self.descriptions[index];
            if !desc.is_external() {
                continue;
            }
            let id = RenderTargetId::from_index(index);
            let fresh = external_entries(id, desc, self.gframe_count)?;
            let offset = index * self.gframe_count;
            for (gframe, entry) in fresh.into_iter().enumerate() {
                self.entries[offset + gframe] = entry;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "render_target_storage_tests.rs"]
mod tests;
