/// Unit tests for MockGraphicsDevice
///
/// The render process tests lean on the mock's event log and failure
/// injection, so both are checked here on their own.

use super::*;
use crate::graphics_device::{ImageUsage, ImageAspect};

fn image_desc(name: &str) -> ImageDesc<'_> {
    ImageDesc {
        name,
        extent: Extent3d::flat(64, 32),
        format: TextureFormat::R8G8B8A8_UNORM,
        usage: ImageUsage::COLOR_ATTACHMENT,
        host_access: None,
    }
}

// ============================================================================
// Creation / destruction events
// ============================================================================

#[test]
fn test_mock_image_create_and_drop_are_logged() {
    let device = MockGraphicsDevice::new();
    let image = device.create_image(&image_desc("img")).unwrap();
    let handle = image.handle().0;

    assert_eq!(device.created(MockObjectKind::Image), 1);
    assert_eq!(device.live(MockObjectKind::Image), 1);

    drop(image);
    assert!(device.was_destroyed(MockObjectKind::Image, handle));
    assert_eq!(device.live(MockObjectKind::Image), 0);
}

#[test]
fn test_mock_handles_are_unique_and_non_null() {
    let device = MockGraphicsDevice::new();
    let a = device.create_image(&image_desc("a")).unwrap();
    let view = device
        .create_image_view(a.as_ref(), &ImageViewDesc {
            format: TextureFormat::R8G8B8A8_UNORM,
            aspect: ImageAspect::COLOR,
            layer_count: 1,
        })
        .unwrap();

    assert_ne!(a.handle().0, 0);
    assert_ne!(a.handle().0, view.handle().0);
}

#[test]
fn test_mock_image_info_reflects_desc() {
    let device = MockGraphicsDevice::new().with_host_visible_images();
    let image = device.create_image(&image_desc("img")).unwrap();

    assert_eq!(image.info().extent, Extent3d::flat(64, 32));
    assert!(image.info().host_visible);
    assert_eq!(device.image_records()[0].name, "img");
}

#[test]
fn test_mock_wait_idle_is_logged() {
    let device = MockGraphicsDevice::new();
    device.wait_idle().unwrap();
    device.wait_idle().unwrap();
    assert_eq!(device.wait_idle_calls(), 2);
}

// ============================================================================
// Failure injection
// ============================================================================

#[test]
fn test_mock_fail_nth_fails_exactly_once() {
    let device = MockGraphicsDevice::new();
    device.fail_nth(MockObjectKind::Image, 2);

    assert!(device.create_image(&image_desc("1")).is_ok());
    assert!(matches!(device.create_image(&image_desc("2")), Err(Error::OutOfMemory)));
    assert!(device.create_image(&image_desc("3")).is_ok());
    assert_eq!(device.created(MockObjectKind::Image), 2);
}

#[test]
fn test_mock_failure_only_affects_its_kind() {
    let device = MockGraphicsDevice::new();
    device.fail_nth(MockObjectKind::Buffer, 1);

    assert!(device.create_image(&image_desc("img")).is_ok());
    let result = device.create_staging_buffer(&StagingBufferDesc {
        name: "staging",
        size: 16,
        access: HostAccessPattern::Random,
        host_readable: true,
        host_writable: false,
    });
    match result {
        Err(Error::BackendError(msg)) => assert!(msg.contains("Injected")),
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("expected an injected failure"),
    }
}

// ============================================================================
// Staging memory / command pools / sync primitives
// ============================================================================

#[test]
fn test_mock_buffer_write_then_read() {
    let device = MockGraphicsDevice::new();
    let buffer = device
        .create_staging_buffer(&StagingBufferDesc {
            name: "staging",
            size: 8,
            access: HostAccessPattern::Sequential,
            host_readable: true,
            host_writable: true,
        })
        .unwrap();

    buffer.write(2, &[7, 8, 9]).unwrap();
    let mut out = [0u8; 5];
    buffer.read(1, &mut out).unwrap();
    assert_eq!(out, [0, 7, 8, 9, 0]);

    assert!(buffer.write(6, &[1, 2, 3]).is_err());
    assert!(buffer.read(9, &mut [0u8; 1]).is_err());
}

#[test]
fn test_mock_command_pool_allocates_buffers() {
    let device = MockGraphicsDevice::new();
    let pool = device
        .create_command_pool(&CommandPoolDesc { name: "wave", buffer_count: 2 })
        .unwrap();
    let handle = pool.handle().0;

    assert_eq!(pool.command_buffers(), &[
        CommandBufferHandle(handle * 1000),
        CommandBufferHandle(handle * 1000 + 1),
    ]);
    pool.reset().unwrap();

    drop(pool);
    assert!(device.was_destroyed(MockObjectKind::CommandPool, handle));
}

#[test]
fn test_mock_fence_signaled_state() {
    let device = MockGraphicsDevice::new();
    let fence = device.create_fence(true).unwrap();
    assert!(fence.wait(0).unwrap());

    fence.reset().unwrap();
    assert!(!fence.wait(0).unwrap());

    let semaphore = device.create_semaphore().unwrap();
    assert_ne!(semaphore.handle().0, fence.handle().0);
    assert_eq!(device.live(MockObjectKind::Fence), 1);
    assert_eq!(device.live(MockObjectKind::Semaphore), 1);
}
