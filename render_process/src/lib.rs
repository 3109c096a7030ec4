/*!
# Render Process

Render graph compiler and executor.

A [`DependencyGraph`](rproc::DependencyGraph) declares render targets, render
passes, renderers and steps, plus ordering constraints between steps. It
compiles into a wave sequence: each step lands in the first wave after all of
its predecessors. A [`RenderProcess`](rproc::RenderProcess) then owns the GPU
objects the sequence needs (per-gframe render target images, a shared pool of
depth images, render passes and framebuffers), recreates them on resize or
gframe count change, and hands the waves out in order.

## Architecture

- **GraphicsDevice**: backend trait creating images, views, staging buffers,
  render passes and framebuffers
- **RenderTargetStorage**: per-gframe render target entries, managed or external
- **DependencyGraph**: declaration and wave sequencing
- **RenderProcess**: setup / reset / destroy lifecycle and wave iteration
- **Renderer**: the caller-supplied side of a step

Backend implementations (Vulkan) live in their own crates.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod ids;
pub mod config;
pub mod graphics_device;
pub mod render_target;
pub mod render_process;

// Main rproc namespace module
pub mod rproc {
    // Error types
    pub use crate::error::{Error, Result, UnsatisfiableDependencyError};

    // Engine singleton (logger holder)
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::RenderProcessConfig;

    // Identifiers
    pub use crate::ids::{RenderPassId, RenderTargetId, RendererId, SequenceIndex, StepId};

    // Graph, process, renderers, waves
    pub use crate::render_process::*;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device sub-module with the GPU object vocabulary
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Render target sub-module
    pub mod target {
        pub use crate::render_target::*;
    }
}
