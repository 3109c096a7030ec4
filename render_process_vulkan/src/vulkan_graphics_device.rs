/// VulkanGraphicsDevice - GraphicsDevice implementation on ash + gpu-allocator
///
/// Creates images (with their memory), views, staging buffers, render passes
/// and framebuffers. The device can own its Vulkan instance (headless, for
/// offscreen use and tests) or wrap a device the application already created,
/// e.g. the one its swapchain lives on.

use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use render_process::rproc::device::{
    CommandPoolDesc, DeviceBuffer, DeviceCommandPool, DeviceFence, DeviceFramebuffer, DeviceImage,
    DeviceImageView, DeviceRenderPass, DeviceSemaphore, FramebufferDesc, GraphicsDevice, ImageDesc,
    ImageInfo, ImageViewDesc, RenderPassDesc, StagingBufferDesc,
};
use render_process::rproc::{Error, Result};
use render_process::{engine_bail, engine_debug, engine_err, engine_error, engine_info};
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_command_pool::CommandPool;
use crate::vulkan_context::{GpuContext, InstanceOwner};
use crate::vulkan_format::{
    access_flags_to_vk, aspect_to_vk, dependency_flags_to_vk, format_to_vk, host_access_location,
    image_layout_to_vk, image_usage_to_vk, load_op_to_vk, pipeline_stages_to_vk, store_op_to_vk,
    subpass_source_to_vk, view_type_for_layers,
};
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_image::{Image, ImageView};
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_sync::{Fence, Semaphore};

/// Configuration of a headless device
#[derive(Debug, Clone)]
pub struct VulkanDeviceConfig {
    /// Request VK_LAYER_KHRONOS_validation and forward its messages to the logger
    pub enable_validation: bool,
}

impl Default for VulkanDeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(feature = "vulkan-validation"),
        }
    }
}

/// Vulkan graphics device
pub struct VulkanGraphicsDevice {
    ctx: Arc<GpuContext>,
    physical_device: vk::PhysicalDevice,
    graphics_queue_family: u32,
}

impl VulkanGraphicsDevice {
    /// Create an instance and a logical device with one graphics queue and
    /// no surface support
    pub fn new_headless(config: VulkanDeviceConfig) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!("rproc::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            let app_info = vk::ApplicationInfo::default()
                .application_name(c"render_process")
                .application_version(vk::make_api_version(0, 0, 1, 0))
                .engine_name(c"render_process")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_2);

            let extension_names = if config.enable_validation {
                vec![ash::ext::debug_utils::NAME.as_ptr()]
            } else {
                vec![]
            };
            let layer_names = if config.enable_validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                engine_error!("rproc::vulkan", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            let debug_utils = if config.enable_validation {
                let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);
                crate::vulkan_debug::enable_forwarding();
                match loader.create_debug_utils_messenger(&crate::vulkan_debug::messenger_create_info(), None) {
                    Ok(messenger) => Some((loader, messenger)),
                    Err(e) => {
                        instance.destroy_instance(None);
                        engine_error!("rproc::vulkan", "Failed to create debug messenger: {:?}", e);
                        return Err(Error::InitializationFailed(format!(
                            "Failed to create debug messenger: {:?}", e
                        )));
                    }
                }
            } else {
                None
            };

            let owner = InstanceOwner { _entry: entry, instance, debug_utils };
            match Self::create_logical_device(&owner.instance) {
                Ok((physical_device, graphics_queue_family, device)) => {
                    Self::wrap(owner.instance.clone(), physical_device, graphics_queue_family, device, Some(owner))
                }
                Err(e) => {
                    if let Some((loader, messenger)) = &owner.debug_utils {
                        crate::vulkan_debug::disable_forwarding();
                        loader.destroy_debug_utils_messenger(*messenger, None);
                    }
                    owner.instance.destroy_instance(None);
                    Err(e)
                }
            }
        }
    }

    /// Wrap a device the caller created and keeps ownership of
    ///
    /// # Safety
    ///
    /// `device` must have been created from `physical_device` of `instance`,
    /// and both must outlive every object this graphics device creates.
    pub unsafe fn from_existing(
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        graphics_queue_family: u32,
        device: ash::Device,
    ) -> Result<Self> {
        Self::wrap(instance, physical_device, graphics_queue_family, device, None)
    }

    unsafe fn create_logical_device(instance: &ash::Instance) -> Result<(vk::PhysicalDevice, u32, ash::Device)> {
        let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
            engine_error!("rproc::vulkan", "Failed to enumerate physical devices: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        let (physical_device, graphics_family_index) = physical_devices
            .into_iter()
            .find_map(|pd| {
                instance
                    .get_physical_device_queue_family_properties(pd)
                    .iter()
                    .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|i| (pd, i as u32))
            })
            .ok_or_else(|| {
                engine_error!("rproc::vulkan", "No Vulkan-capable GPU with a graphics queue found");
                Error::InitializationFailed("No Vulkan-capable GPU found".to_string())
            })?;

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_family_index)
            .queue_priorities(&queue_priorities)];
        let device_create_info = vk::DeviceCreateInfo::default().queue_create_infos(&queue_create_infos);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| {
                engine_error!("rproc::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?;

        Ok((physical_device, graphics_family_index, device))
    }

    unsafe fn wrap(
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        graphics_queue_family: u32,
        device: ash::Device,
        owner: Option<InstanceOwner>,
    ) -> Result<Self> {
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance,
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        });
        let allocator = match allocator {
            Ok(allocator) => allocator,
            Err(e) => {
                if let Some(owner) = owner {
                    device.destroy_device(None);
                    if let Some((loader, messenger)) = &owner.debug_utils {
                        crate::vulkan_debug::disable_forwarding();
                        loader.destroy_debug_utils_messenger(*messenger, None);
                    }
                    owner.instance.destroy_instance(None);
                }
                engine_error!("rproc::vulkan", "Failed to create GPU allocator: {:?}", e);
                return Err(Error::InitializationFailed(format!("Failed to create allocator: {:?}", e)));
            }
        };

        let owned = owner.is_some();
        let ctx = Arc::new(GpuContext::new(device, allocator, owner));
        engine_info!("rproc::vulkan", "Vulkan graphics device ready (graphics queue family {}, {})",
            graphics_queue_family, if owned { "headless" } else { "wrapped" });

        Ok(Self { ctx, physical_device, graphics_queue_family })
    }

    /// Shared context (device and allocator)
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }

    fn allocate(
        &self,
        name: &str,
        requirements: vk::MemoryRequirements,
        location: MemoryLocation,
        linear: bool,
    ) -> Result<gpu_allocator::vulkan::Allocation> {
        let mut allocator = self
            .ctx
            .allocator
            .lock()
            .map_err(|_| engine_err!("rproc::vulkan", "GPU allocator lock poisoned"))?;
        allocator
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                engine_error!("rproc::vulkan", "Out of GPU memory for '{}' ({:.2} MB): {:?}", name, size_mb, e);
                Error::OutOfMemory
            })
    }

    fn free(&self, allocation: gpu_allocator::vulkan::Allocation) {
        if let Ok(mut allocator) = self.ctx.allocator.lock() {
            allocator.free(allocation).ok();
        }
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_image(&self, desc: &ImageDesc) -> Result<Box<dyn DeviceImage>> {
        let layers = desc.extent.depth.max(1);
        let image_create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format_to_vk(desc.format))
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(layers)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(image_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        unsafe {
            let image = self
                .ctx
                .device
                .create_image(&image_create_info, None)
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to create image '{}': {:?}", desc.name, e))?;

            let requirements = self.ctx.device.get_image_memory_requirements(image);
            let allocation = match self.allocate(desc.name, requirements, MemoryLocation::GpuOnly, false) {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.ctx.device.destroy_image(image, None);
                    return Err(e);
                }
            };

            if let Err(e) = self.ctx.device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
                self.free(allocation);
                self.ctx.device.destroy_image(image, None);
                engine_bail!("rproc::vulkan", "Failed to bind memory of image '{}': {:?}", desc.name, e);
            }

            engine_debug!("rproc::vulkan", "Created image '{}' {}x{}x{} {:?}",
                desc.name, desc.extent.width, desc.extent.height, layers, desc.format);

            // GpuOnly memory is never mapped, so host transfers go through a staging buffer
            let info = ImageInfo {
                extent: desc.extent,
                format: desc.format,
                usage: desc.usage,
                host_visible: allocation.mapped_ptr().is_some(),
            };
            Ok(Box::new(Image::new(Arc::clone(&self.ctx), image, allocation, info)))
        }
    }

    fn create_image_view(
        &self,
        image: &dyn DeviceImage,
        desc: &ImageViewDesc,
    ) -> Result<Box<dyn DeviceImageView>> {
        let layer_count = desc.layer_count.max(1);
        let view_create_info = vk::ImageViewCreateInfo::default()
            .image(vk::Image::from_raw(image.handle().0))
            .view_type(view_type_for_layers(layer_count))
            .format(format_to_vk(desc.format))
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_to_vk(desc.aspect),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count,
            });

        unsafe {
            let view = self
                .ctx
                .device
                .create_image_view(&view_create_info, None)
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to create image view: {:?}", e))?;
            Ok(Box::new(ImageView::new(Arc::clone(&self.ctx), view)))
        }
    }

    fn create_staging_buffer(&self, desc: &StagingBufferDesc) -> Result<Box<dyn DeviceBuffer>> {
        let mut usage = vk::BufferUsageFlags::empty();
        if desc.host_readable {
            usage |= vk::BufferUsageFlags::TRANSFER_DST;
        }
        if desc.host_writable {
            usage |= vk::BufferUsageFlags::TRANSFER_SRC;
        }
        if usage.is_empty() {
            engine_bail!("rproc::vulkan", "Staging buffer '{}' is neither readable nor writable", desc.name);
        }

        let buffer_create_info = vk::BufferCreateInfo::default()
            .size(desc.size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        unsafe {
            let buffer = self
                .ctx
                .device
                .create_buffer(&buffer_create_info, None)
                .map_err(|e| engine_err!("rproc::vulkan",
                    "Failed to create staging buffer '{}' of size {} bytes: {:?}", desc.name, desc.size, e))?;

            let requirements = self.ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = match self.allocate(desc.name, requirements, host_access_location(desc.access), true) {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.ctx.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            if let Err(e) = self.ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                self.free(allocation);
                self.ctx.device.destroy_buffer(buffer, None);
                engine_bail!("rproc::vulkan", "Failed to bind memory of staging buffer '{}': {:?}", desc.name, e);
            }

            Ok(Box::new(Buffer::new(Arc::clone(&self.ctx), buffer, allocation, desc.size, desc.access)))
        }
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Box<dyn DeviceRenderPass>> {
        let attachments: Vec<vk::AttachmentDescription> = desc
            .attachments
            .iter()
            .map(|a| {
                vk::AttachmentDescription::default()
                    .format(format_to_vk(a.format))
                    .samples(match a.samples {
                        2 => vk::SampleCountFlags::TYPE_2,
                        4 => vk::SampleCountFlags::TYPE_4,
                        8 => vk::SampleCountFlags::TYPE_8,
                        _ => vk::SampleCountFlags::TYPE_1,
                    })
                    .load_op(load_op_to_vk(a.load_op))
                    .store_op(store_op_to_vk(a.store_op))
                    .stencil_load_op(load_op_to_vk(a.stencil_load_op))
                    .stencil_store_op(store_op_to_vk(a.stencil_store_op))
                    .initial_layout(image_layout_to_vk(a.initial_layout))
                    .final_layout(image_layout_to_vk(a.final_layout))
            })
            .collect();

        let references: Vec<vk::AttachmentReference> = desc
            .references
            .iter()
            .map(|r| {
                vk::AttachmentReference::default()
                    .attachment(r.attachment)
                    .layout(image_layout_to_vk(r.layout))
            })
            .collect();

        let mut subpasses = Vec::with_capacity(desc.subpasses.len());
        for (index, subpass) in desc.subpasses.iter().enumerate() {
            let (Some(inputs), Some(colors)) = (
                references.get(subpass.input_attachments.clone()),
                references.get(subpass.color_attachments.clone()),
            ) else {
                engine_bail!("rproc::vulkan", "Subpass {} of '{}' references missing attachments", index, desc.name);
            };
            let mut vk_subpass = vk::SubpassDescription::default()
                .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
                .input_attachments(inputs)
                .color_attachments(colors);
            if let Some(depth) = subpass.depth_attachment {
                let Some(depth_ref) = references.get(depth) else {
                    engine_bail!("rproc::vulkan", "Subpass {} of '{}' references a missing depth attachment", index, desc.name);
                };
                vk_subpass = vk_subpass.depth_stencil_attachment(depth_ref);
            }
            subpasses.push(vk_subpass);
        }

        let dependencies: Vec<vk::SubpassDependency> = desc
            .dependencies
            .iter()
            .map(|d| {
                vk::SubpassDependency::default()
                    .src_subpass(subpass_source_to_vk(d.src_subpass))
                    .dst_subpass(d.dst_subpass)
                    .src_stage_mask(pipeline_stages_to_vk(d.src_stage_mask))
                    .dst_stage_mask(pipeline_stages_to_vk(d.dst_stage_mask))
                    .src_access_mask(access_flags_to_vk(d.src_access_mask))
                    .dst_access_mask(access_flags_to_vk(d.dst_access_mask))
                    .dependency_flags(dependency_flags_to_vk(d.flags))
            })
            .collect();

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        unsafe {
            let render_pass = self
                .ctx
                .device
                .create_render_pass(&render_pass_info, None)
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to create render pass '{}': {:?}", desc.name, e))?;
            Ok(Box::new(RenderPass::new(Arc::clone(&self.ctx), render_pass)))
        }
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Box<dyn DeviceFramebuffer>> {
        let attachments: Vec<vk::ImageView> = desc
            .attachments
            .iter()
            .map(|view| vk::ImageView::from_raw(view.0))
            .collect();

        let framebuffer_info = vk::FramebufferCreateInfo::default()
            .render_pass(vk::RenderPass::from_raw(desc.render_pass.handle().0))
            .attachments(&attachments)
            .width(desc.width)
            .height(desc.height)
            .layers(desc.layers.max(1));

        unsafe {
            let framebuffer = self
                .ctx
                .device
                .create_framebuffer(&framebuffer_info, None)
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to create framebuffer: {:?}", e))?;
            Ok(Box::new(Framebuffer::new(
                Arc::clone(&self.ctx),
                framebuffer,
                desc.width,
                desc.height,
                desc.layers.max(1),
            )))
        }
    }

    fn create_command_pool(&self, desc: &CommandPoolDesc) -> Result<Box<dyn DeviceCommandPool>> {
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(self.graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        unsafe {
            let pool = self
                .ctx
                .device
                .create_command_pool(&pool_info, None)
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to create command pool '{}': {:?}", desc.name, e))?;

            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(desc.buffer_count);

            let buffers = match self.ctx.device.allocate_command_buffers(&allocate_info) {
                Ok(buffers) => buffers,
                Err(e) => {
                    self.ctx.device.destroy_command_pool(pool, None);
                    engine_bail!("rproc::vulkan",
                        "Failed to allocate {} command buffer(s) for '{}': {:?}", desc.buffer_count, desc.name, e);
                }
            };
            Ok(Box::new(CommandPool::new(Arc::clone(&self.ctx), pool, &buffers)))
        }
    }

    fn create_fence(&self, signaled: bool) -> Result<Box<dyn DeviceFence>> {
        let flags = if signaled { vk::FenceCreateFlags::SIGNALED } else { vk::FenceCreateFlags::empty() };
        let fence_info = vk::FenceCreateInfo::default().flags(flags);

        unsafe {
            let fence = self
                .ctx
                .device
                .create_fence(&fence_info, None)
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to create fence: {:?}", e))?;
            Ok(Box::new(Fence::new(Arc::clone(&self.ctx), fence)))
        }
    }

    fn create_semaphore(&self) -> Result<Box<dyn DeviceSemaphore>> {
        let semaphore_info = vk::SemaphoreCreateInfo::default();

        unsafe {
            let semaphore = self
                .ctx
                .device
                .create_semaphore(&semaphore_info, None)
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to create semaphore: {:?}", e))?;
            Ok(Box::new(Semaphore::new(Arc::clone(&self.ctx), semaphore)))
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!("rproc::vulkan", "Failed to wait idle: {:?}", e))
        }
    }
}
