/// Render target module - declarations and per-gframe storage

pub mod render_target_description;
pub mod render_target_storage;

pub use render_target_description::*;
pub use render_target_storage::*;
