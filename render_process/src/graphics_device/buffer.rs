/// Staging buffer trait and descriptor
///
/// Staging buffers give the host access to render targets whose device image
/// is not host-visible. They are sized to the raw byte size of the image.

use crate::error::Result;
use crate::graphics_device::HostAccessPattern;

/// Opaque native buffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BufferHandle(pub u64);

/// Descriptor for creating a staging buffer
#[derive(Debug, Clone)]
pub struct StagingBufferDesc<'a> {
    /// Debug name
    pub name: &'a str,
    /// Size in bytes
    pub size: u64,
    /// Host access pattern
    pub access: HostAccessPattern,
    /// Host reads from the buffer (device copies into it)
    pub host_readable: bool,
    /// Host writes into the buffer (device copies out of it)
    pub host_writable: bool,
}

/// Host-visible buffer; dropping it releases the native buffer and its memory
pub trait DeviceBuffer: Send + Sync {
    /// Native handle
    fn handle(&self) -> BufferHandle;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Access pattern the memory was chosen for
    fn access(&self) -> HostAccessPattern;

    /// Copy `data` into the buffer at `offset`
    ///
    /// Fails if the range exceeds the buffer size.
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Copy `out.len()` bytes starting at `offset` into `out`
    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()>;
}
