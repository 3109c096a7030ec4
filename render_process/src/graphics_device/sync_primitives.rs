/// Fence and semaphore traits
///
/// Fences let the host wait for submitted work; semaphores order
/// submissions on the device. Both are destroyed when dropped.

use crate::error::Result;

/// Opaque native fence handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FenceHandle(pub u64);

/// Opaque native semaphore handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SemaphoreHandle(pub u64);

/// Host-waitable fence
pub trait DeviceFence: Send + Sync {
    /// Native handle
    fn handle(&self) -> FenceHandle;

    /// Wait up to `timeout_ns` for the fence to be signaled
    ///
    /// Returns `false` on timeout.
    fn wait(&self, timeout_ns: u64) -> Result<bool>;

    /// Return the fence to the unsignaled state
    fn reset(&self) -> Result<()>;
}

/// Device-side semaphore
pub trait DeviceSemaphore: Send + Sync {
    /// Native handle
    fn handle(&self) -> SemaphoreHandle;
}
