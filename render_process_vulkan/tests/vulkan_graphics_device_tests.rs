//! Tests for VulkanGraphicsDevice against a real GPU
//!
//! All tests require a Vulkan driver and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_graphics_device_tests -- --ignored
//! (add `--features vulkan-validation` to forward validation layer messages)

use std::sync::Arc;

use render_process::rproc::device::{
    CommandPoolDesc, Extent3d, GraphicsDevice, HostAccessPattern, ImageDesc, ImageLayout, ImageUsage,
    ImageViewDesc, StagingBufferDesc, TextureFormat,
};
use render_process::rproc::target::RenderTargetDescription;
use render_process::rproc::{
    AttachmentReference, DependencyGraph, DepthAttachment, DrawContext, GpuDrained, RenderPassDescription,
    RenderProcess, RenderProcessConfig, Renderer, Result, RtargetResizeInfo, SequenceIndex, Subpass,
};
use render_process_vulkan::{get_validation_stats, VulkanDeviceConfig, VulkanGraphicsDevice};
use serial_test::serial;

struct NullRenderer;

impl Renderer for NullRenderer {
    fn name(&self) -> &str {
        "null"
    }

    fn draw(&self, _ctx: &DrawContext<'_>) -> Result<()> {
        Ok(())
    }
}

fn headless() -> VulkanGraphicsDevice {
    VulkanGraphicsDevice::new_headless(VulkanDeviceConfig::default()).unwrap()
}

// ============================================================================
// DEVICE OBJECT TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_image_and_view() {
    let device = headless();
    let image = device
        .create_image(&ImageDesc {
            name: "color",
            extent: Extent3d::flat(256, 128),
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::SAMPLED,
            host_access: None,
        })
        .unwrap();

    let info = image.info();
    assert_eq!(info.extent, Extent3d::flat(256, 128));
    assert_eq!(info.format, TextureFormat::R8G8B8A8_UNORM);
    assert!(!info.host_visible);

    let view = device
        .create_image_view(image.as_ref(), &ImageViewDesc::full(info))
        .unwrap();
    assert_ne!(view.handle().0, 0);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_layered_depth_image() {
    let device = headless();
    let image = device
        .create_image(&ImageDesc {
            name: "depth array",
            extent: Extent3d::new(64, 64, 4),
            format: TextureFormat::D32_FLOAT,
            usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
            host_access: None,
        })
        .unwrap();

    let view = device
        .create_image_view(image.as_ref(), &ImageViewDesc::full(image.info()))
        .unwrap();
    assert_ne!(view.handle().0, 0);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_staging_buffer() {
    let device = headless();
    let ctx = Arc::clone(device.context());
    let buffer = device
        .create_staging_buffer(&StagingBufferDesc {
            name: "readback",
            size: 64,
            access: HostAccessPattern::Random,
            host_readable: true,
            host_writable: true,
        })
        .unwrap();
    assert_eq!(buffer.size(), 64);
    assert_eq!(buffer.access(), HostAccessPattern::Random);
    assert!(ctx.owns_device());

    buffer.write(16, &[1, 2, 3, 4]).unwrap();
    let mut out = [0u8; 4];
    buffer.read(16, &mut out).unwrap();
    assert_eq!(out, [1, 2, 3, 4]);
    assert!(buffer.write(62, &[0; 4]).is_err());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_staging_buffer_needs_a_direction() {
    let device = headless();
    let result = device.create_staging_buffer(&StagingBufferDesc {
        name: "useless",
        size: 64,
        access: HostAccessPattern::Sequential,
        host_readable: false,
        host_writable: false,
    });
    assert!(result.is_err());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_command_pool_and_sync_primitives() {
    let device = headless();
    let pool = device
        .create_command_pool(&CommandPoolDesc { name: "wave", buffer_count: 2 })
        .unwrap();
    assert_eq!(pool.command_buffers().len(), 2);
    assert_ne!(pool.command_buffers()[0], pool.command_buffers()[1]);
    pool.reset().unwrap();

    let fence = device.create_fence(true).unwrap();
    assert!(fence.wait(0).unwrap());
    fence.reset().unwrap();
    assert!(!fence.wait(0).unwrap());

    let unsignaled = device.create_fence(false).unwrap();
    assert!(!unsignaled.wait(1_000).unwrap());

    let semaphore = device.create_semaphore().unwrap();
    assert_ne!(semaphore.handle().0, 0);
}

// ============================================================================
// RENDER PROCESS TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_render_process_lifecycle() {
    let device: Arc<dyn GraphicsDevice> = Arc::new(headless());
    let renderer: Arc<dyn Renderer> = Arc::new(NullRenderer);

    let mut graph = DependencyGraph::new();
    let renderer_id = graph.add_renderer(Arc::downgrade(&renderer));
    let shadow_target = graph.add_rtarget(RenderTargetDescription::managed(
        Extent3d::flat(512, 512),
        ImageUsage::COLOR_ATTACHMENT | ImageUsage::SAMPLED,
        TextureFormat::R32_SFLOAT,
    ));
    let scene_target = graph.add_rtarget(RenderTargetDescription::managed(
        Extent3d::flat(320, 240),
        ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_SRC,
        TextureFormat::R8G8B8A8_UNORM,
    ));
    let shadow_pass = graph.add_rpass(
        RenderPassDescription::new("shadow").with_subpass(
            Subpass::new()
                .with_color(AttachmentReference::color(shadow_target, ImageLayout::ShaderReadOnly))
                .with_depth(DepthAttachment::pooled()),
        ),
    );
    let scene_pass = graph.add_rpass(
        RenderPassDescription::new("scene").with_subpass(
            Subpass::new()
                .with_color(AttachmentReference::color(scene_target, ImageLayout::TransferSrc))
                .with_depth(DepthAttachment::pooled()),
        ),
    );
    let shadow = graph.add_step(shadow_pass, renderer_id).id();
    graph.add_step(scene_pass, renderer_id).after(shadow);

    let mut process = RenderProcess::new();
    process
        .setup_from_graph(Arc::clone(&device), &RenderProcessConfig::default(), &graph)
        .unwrap();
    assert!(process.is_ready());
    assert_eq!(process.wave_count(), 2);

    for gframe in 0..process.gframe_count() {
        for wave in process.wave_range() {
            process.prepare_wave(&wave, gframe).unwrap();
            process.draw_wave(&wave, gframe).unwrap();
        }
    }
    assert!(process.get_draw_sync_primitives(SequenceIndex(1), 1).unwrap().wait(0).unwrap());

    let drained = GpuDrained::wait_idle(device.as_ref()).unwrap();
    let report = process
        .reset(drained, 3, &[RtargetResizeInfo { rtarget: scene_target, new_extent: Extent3d::flat(640, 480) }])
        .unwrap();
    assert!(report.gframe_count_changed);
    assert_eq!(report.recreated_render_passes, vec![shadow_pass, scene_pass]);
    assert_eq!(process.gframe_count(), 3);
    assert!(process.get_wave_command_buffers(SequenceIndex(1), 2).is_some());

    process.destroy().unwrap();
    assert!(!process.is_ready());
    assert_eq!(get_validation_stats().errors, 0);
}
