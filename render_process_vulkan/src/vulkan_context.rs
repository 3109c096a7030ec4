/// GpuContext - Shared Vulkan state for every device object
///
/// Every image, view, buffer, render pass and framebuffer keeps an
/// `Arc<GpuContext>`, so the logical device outlives all of its objects no
/// matter in which order the caller drops them.

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::Mutex;

/// Instance-level objects owned by a headless device
pub(crate) struct InstanceOwner {
    /// Keeps the Vulkan library loaded
    pub(crate) _entry: ash::Entry,
    pub(crate) instance: ash::Instance,
    pub(crate) debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

/// Shared GPU context for all Vulkan objects.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so it is dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Set when the context created the instance and device itself
    owner: Option<InstanceOwner>,
}

impl GpuContext {
    /// Wrap a device; `owner` is `Some` when the context must destroy the
    /// device and instance on drop
    pub(crate) fn new(device: ash::Device, allocator: Allocator, owner: Option<InstanceOwner>) -> Self {
        Self {
            device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            owner,
        }
    }

    /// Whether the device and instance are destroyed with this context
    pub fn owns_device(&self) -> bool {
        self.owner.is_some()
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            // 1. Free VkDeviceMemory pages while the device is alive
            ManuallyDrop::drop(&mut self.allocator);

            let Some(owner) = self.owner.take() else {
                return;
            };

            // 2. Device
            self.device.device_wait_idle().ok();
            self.device.destroy_device(None);

            // 3. Debug messenger BEFORE the instance
            if let Some((debug_utils, messenger)) = &owner.debug_utils {
                crate::vulkan_debug::disable_forwarding();
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }

            // 4. Instance
            owner.instance.destroy_instance(None);
        }
    }
}
