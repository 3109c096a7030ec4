/// Command pool trait - owner of the primary command buffers of one wave
///
/// Command buffers are allocated together with their pool and freed when
/// the pool is dropped. Recording and submission are up to the caller.

use crate::error::Result;

/// Opaque native command pool handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CommandPoolHandle(pub u64);

/// Opaque native command buffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CommandBufferHandle(pub u64);

/// Descriptor for creating a command pool
#[derive(Debug, Clone)]
pub struct CommandPoolDesc<'a> {
    /// Debug name
    pub name: &'a str,
    /// Number of primary command buffers to allocate from the pool
    pub buffer_count: u32,
}

/// Command pool; dropping it frees its command buffers and destroys the pool
pub trait DeviceCommandPool: Send + Sync {
    /// Native handle
    fn handle(&self) -> CommandPoolHandle;

    /// Command buffers allocated at creation, in allocation order
    fn command_buffers(&self) -> &[CommandBufferHandle];

    /// Return every command buffer of the pool to the initial state
    fn reset(&self) -> Result<()>;
}
