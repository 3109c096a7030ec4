/// Mock graphics device for unit tests (no GPU required)
///
/// Every creation and every drop of a mock object is appended to a shared
/// event log, so tests can assert what was created, what was destroyed, and
/// in which order. Creations can be made to fail on demand.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::engine_bail;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferHandle, CommandBufferHandle, CommandPoolDesc, CommandPoolHandle, DeviceBuffer,
    DeviceCommandPool, DeviceFence, DeviceFramebuffer, DeviceImage, DeviceImageView,
    DeviceRenderPass, DeviceSemaphore, Extent3d, FenceHandle, FramebufferDesc, FramebufferHandle,
    GraphicsDevice, HostAccessPattern, ImageDesc, ImageHandle, ImageInfo, ImageViewDesc,
    ImageViewHandle, RenderPassDesc, RenderPassHandle, SemaphoreHandle, StagingBufferDesc,
    TextureFormat,
};

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockObjectKind {
    Image,
    ImageView,
    Buffer,
    RenderPass,
    Framebuffer,
    CommandPool,
    Fence,
    Semaphore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    Create(MockObjectKind, u64),
    Destroy(MockObjectKind, u64),
    WaitIdle,
}

type EventLog = Arc<Mutex<Vec<MockEvent>>>;

fn record(log: &EventLog, event: MockEvent) {
    if let Ok(mut events) = log.lock() {
        events.push(event);
    }
}

/// What a framebuffer was created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFramebufferRecord {
    pub handle: u64,
    pub render_pass: RenderPassHandle,
    pub attachments: Vec<ImageViewHandle>,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

/// What an image was created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockImageRecord {
    pub handle: u64,
    pub name: String,
    pub extent: Extent3d,
    pub format: TextureFormat,
}

/// What a staging buffer was created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBufferRecord {
    pub handle: u64,
    pub name: String,
    pub size: u64,
    pub access: HostAccessPattern,
}

// ============================================================================
// Mock objects
// ============================================================================

pub struct MockImage {
    handle: u64,
    info: ImageInfo,
    log: EventLog,
}

impl DeviceImage for MockImage {
    fn handle(&self) -> ImageHandle {
        ImageHandle(self.handle)
    }

    fn info(&self) -> &ImageInfo {
        &self.info
    }
}

impl Drop for MockImage {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::Image, self.handle));
    }
}

pub struct MockImageView {
    handle: u64,
    log: EventLog,
}

impl DeviceImageView for MockImageView {
    fn handle(&self) -> ImageViewHandle {
        ImageViewHandle(self.handle)
    }
}

impl Drop for MockImageView {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::ImageView, self.handle));
    }
}

pub struct MockBuffer {
    handle: u64,
    size: u64,
    access: HostAccessPattern,
    memory: Mutex<Vec<u8>>,
    log: EventLog,
}

impl MockBuffer {
    fn checked_range(&self, offset: u64, len: usize) -> Result<std::ops::Range<usize>> {
        let end = offset.saturating_add(len as u64);
        if end > self.size {
            engine_bail!("rproc::mock", "Buffer access {}..{} out of {} bytes", offset, end, self.size);
        }
        Ok(offset as usize..end as usize)
    }
}

impl DeviceBuffer for MockBuffer {
    fn handle(&self) -> BufferHandle {
        BufferHandle(self.handle)
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn access(&self) -> HostAccessPattern {
        self.access
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let range = self.checked_range(offset, data.len())?;
        let mut memory = self.memory.lock().map_err(|_| Error::BackendError("poisoned".to_string()))?;
        memory[range].copy_from_slice(data);
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        let range = self.checked_range(offset, out.len())?;
        let memory = self.memory.lock().map_err(|_| Error::BackendError("poisoned".to_string()))?;
        out.copy_from_slice(&memory[range]);
        Ok(())
    }
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::Buffer, self.handle));
    }
}

pub struct MockRenderPass {
    handle: u64,
    log: EventLog,
}

impl DeviceRenderPass for MockRenderPass {
    fn handle(&self) -> RenderPassHandle {
        RenderPassHandle(self.handle)
    }
}

impl Drop for MockRenderPass {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::RenderPass, self.handle));
    }
}

pub struct MockFramebuffer {
    handle: u64,
    width: u32,
    height: u32,
    layers: u32,
    log: EventLog,
}

impl DeviceFramebuffer for MockFramebuffer {
    fn handle(&self) -> FramebufferHandle {
        FramebufferHandle(self.handle)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn layers(&self) -> u32 {
        self.layers
    }
}

impl Drop for MockFramebuffer {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::Framebuffer, self.handle));
    }
}

pub struct MockCommandPool {
    handle: u64,
    buffers: Vec<CommandBufferHandle>,
    resets: AtomicU64,
    log: EventLog,
}

impl MockCommandPool {
    pub fn reset_count(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }
}

impl DeviceCommandPool for MockCommandPool {
    fn handle(&self) -> CommandPoolHandle {
        CommandPoolHandle(self.handle)
    }

    fn command_buffers(&self) -> &[CommandBufferHandle] {
        &self.buffers
    }

    fn reset(&self) -> Result<()> {
        self.resets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Drop for MockCommandPool {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::CommandPool, self.handle));
    }
}

/// Fence whose signaled state only changes through `reset` and `signal`
pub struct MockFence {
    handle: u64,
    signaled: AtomicBool,
    log: EventLog,
}

impl MockFence {
    pub fn signal(&self) {
        self.signaled.store(true, Ordering::SeqCst);
    }
}

impl DeviceFence for MockFence {
    fn handle(&self) -> FenceHandle {
        FenceHandle(self.handle)
    }

    fn wait(&self, _timeout_ns: u64) -> Result<bool> {
        Ok(self.signaled.load(Ordering::SeqCst))
    }

    fn reset(&self) -> Result<()> {
        self.signaled.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockFence {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::Fence, self.handle));
    }
}

pub struct MockSemaphore {
    handle: u64,
    log: EventLog,
}

impl DeviceSemaphore for MockSemaphore {
    fn handle(&self) -> SemaphoreHandle {
        SemaphoreHandle(self.handle)
    }
}

impl Drop for MockSemaphore {
    fn drop(&mut self) {
        record(&self.log, MockEvent::Destroy(MockObjectKind::Semaphore, self.handle));
    }
}

// ============================================================================
// Mock device
// ============================================================================

pub struct MockGraphicsDevice {
    log: EventLog,
    next_handle: AtomicU64,
    host_visible_images: bool,
    /// Pending failures: (kind, attempts left until the failing one)
    failures: Mutex<Vec<(MockObjectKind, usize)>>,
    images: Mutex<Vec<MockImageRecord>>,
    buffers: Mutex<Vec<MockBufferRecord>>,
    render_passes: Mutex<Vec<RenderPassDesc>>,
    framebuffers: Mutex<Vec<MockFramebufferRecord>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            next_handle: AtomicU64::new(1),
            host_visible_images: false,
            failures: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
            buffers: Mutex::new(Vec::new()),
            render_passes: Mutex::new(Vec::new()),
            framebuffers: Mutex::new(Vec::new()),
        }
    }

    /// Report every created image as host-visible (no staging buffers needed)
    pub fn with_host_visible_images(mut self) -> Self {
        self.host_visible_images = true;
        self
    }

    /// Make the `n`-th creation of `kind` from now on fail (1-based)
    pub fn fail_nth(&self, kind: MockObjectKind, n: usize) {
        assert!(n >= 1);
        self.failures.lock().unwrap().push((kind, n));
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn created(&self, kind: MockObjectKind) -> usize {
        self.count(|e| matches!(e, MockEvent::Create(k, _) if *k == kind))
    }

    pub fn destroyed(&self, kind: MockObjectKind) -> usize {
        self.count(|e| matches!(e, MockEvent::Destroy(k, _) if *k == kind))
    }

    /// Objects of `kind` created and not yet dropped (since the last `clear_events`)
    pub fn live(&self, kind: MockObjectKind) -> isize {
        self.created(kind) as isize - self.destroyed(kind) as isize
    }

    pub fn was_destroyed(&self, kind: MockObjectKind, handle: u64) -> bool {
        self.events().contains(&MockEvent::Destroy(kind, handle))
    }

    pub fn wait_idle_calls(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::WaitIdle))
    }

    pub fn image_records(&self) -> Vec<MockImageRecord> {
        self.images.lock().unwrap().clone()
    }

    pub fn buffer_records(&self) -> Vec<MockBufferRecord> {
        self.buffers.lock().unwrap().clone()
    }

    pub fn render_pass_descs(&self) -> Vec<RenderPassDesc> {
        self.render_passes.lock().unwrap().clone()
    }

    pub fn framebuffer_records(&self) -> Vec<MockFramebufferRecord> {
        self.framebuffers.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&MockEvent) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    /// Consume one attempt of `kind`, failing if a scheduled failure is due
    fn attempt(&self, kind: MockObjectKind) -> Result<u64> {
        let mut failures = self.failures.lock().unwrap();
        if let Some(pos) = failures.iter().position(|(k, _)| *k == kind) {
            if failures[pos].1 == 1 {
                failures.remove(pos);
                if kind == MockObjectKind::Image {
                    return Err(Error::OutOfMemory);
                }
                engine_bail!("rproc::mock", "Injected {:?} creation failure", kind);
            }
            failures[pos].1 -= 1;
        }
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        record(&self.log, MockEvent::Create(kind, handle));
        Ok(handle)
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_image(&self, desc: &ImageDesc) -> Result<Box<dyn DeviceImage>> {
        let handle = self.attempt(MockObjectKind::Image)?;
        self.images.lock().unwrap().push(MockImageRecord {
            handle,
            name: desc.name.to_string(),
            extent: desc.extent,
            format: desc.format,
        });
        Ok(Box::new(MockImage {
            handle,
            info: ImageInfo {
                extent: desc.extent,
                format: desc.format,
                usage: desc.usage,
                host_visible: self.host_visible_images,
            },
            log: self.log.clone(),
        }))
    }

    fn create_image_view(
        &self,
        _image: &dyn DeviceImage,
        _desc: &ImageViewDesc,
    ) -> Result<Box<dyn DeviceImageView>> {
        let handle = self.attempt(MockObjectKind::ImageView)?;
        Ok(Box::new(MockImageView { handle, log: self.log.clone() }))
    }

    fn create_staging_buffer(&self, desc: &StagingBufferDesc) -> Result<Box<dyn DeviceBuffer>> {
        let handle = self.attempt(MockObjectKind::Buffer)?;
        self.buffers.lock().unwrap().push(MockBufferRecord {
            handle,
            name: desc.name.to_string(),
            size: desc.size,
            access: desc.access,
        });
        Ok(Box::new(MockBuffer {
            handle,
            size: desc.size,
            access: desc.access,
            memory: Mutex::new(vec![0; desc.size as usize]),
            log: self.log.clone(),
        }))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Box<dyn DeviceRenderPass>> {
        let handle = self.attempt(MockObjectKind::RenderPass)?;
        self.render_passes.lock().unwrap().push(desc.clone());
        Ok(Box::new(MockRenderPass { handle, log: self.log.clone() }))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Box<dyn DeviceFramebuffer>> {
        let handle = self.attempt(MockObjectKind::Framebuffer)?;
        self.framebuffers.lock().unwrap().push(MockFramebufferRecord {
            handle,
            render_pass: desc.render_pass.handle(),
            attachments: desc.attachments.to_vec(),
            width: desc.width,
            height: desc.height,
            layers: desc.layers,
        });
        Ok(Box::new(MockFramebuffer {
            handle,
            width: desc.width,
            height: desc.height,
            layers: desc.layers,
            log: self.log.clone(),
        }))
    }

    fn create_command_pool(&self, desc: &CommandPoolDesc) -> Result<Box<dyn DeviceCommandPool>> {
        let handle = self.attempt(MockObjectKind::CommandPool)?;
        // Command buffers are numbered after their pool: pool 7 owns 7000, 7001, ...
        let buffers = (0..desc.buffer_count as u64)
            .map(|i| CommandBufferHandle(handle * 1000 + i))
            .collect();
        Ok(Box::new(MockCommandPool {
            handle,
            buffers,
            resets: AtomicU64::new(0),
            log: self.log.clone(),
        }))
    }

    fn create_fence(&self, signaled: bool) -> Result<Box<dyn DeviceFence>> {
        let handle = self.attempt(MockObjectKind::Fence)?;
        Ok(Box::new(MockFence {
            handle,
            signaled: AtomicBool::new(signaled),
            log: self.log.clone(),
        }))
    }

    fn create_semaphore(&self) -> Result<Box<dyn DeviceSemaphore>> {
        let handle = self.attempt(MockObjectKind::Semaphore)?;
        Ok(Box::new(MockSemaphore { handle, log: self.log.clone() }))
    }

    fn wait_idle(&self) -> Result<()> {
        record(&self.log, MockEvent::WaitIdle);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
