/// Graphics device module - device trait and the GPU object vocabulary

// Module declarations
pub mod graphics_device;
pub mod image;
pub mod buffer;
pub mod render_pass;
pub mod frame_buffer;
pub mod command_pool;
pub mod sync_primitives;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use image::*;
pub use buffer::*;
pub use render_pass::*;
pub use frame_buffer::*;
pub use command_pool::*;
pub use sync_primitives::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
