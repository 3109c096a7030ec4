/// Render process module - step graph, sequencing, GPU object ownership

pub mod dependency_graph;
pub mod graph_loop;
pub mod render_pass;
pub mod depth_pool;
pub mod renderer;
pub mod wave_iterator;
pub mod wave_resources;
pub mod render_process;

pub use dependency_graph::*;
pub use graph_loop::detect_graph_loop;
pub use render_pass::{
    AttachmentReference, DepthAttachment, RenderPass, RenderPassDescription, Subpass,
    SubpassDependency,
};
pub use depth_pool::{DepthImage, DepthPool, DepthSlotPlan};
pub use renderer::*;
pub use wave_iterator::*;
pub use wave_resources::{DrawSyncPrimitives, WaveCommandBuffers, WaveFrame};
pub use render_process::*;
