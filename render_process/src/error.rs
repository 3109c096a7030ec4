//! Error types for the render process
//!
//! This module defines the error types used throughout the crate,
//! including graph compilation, GPU resource creation and lifecycle misuse.

use std::fmt;

use crate::ids::StepId;

/// Result type for render process operations
pub type Result<T> = std::result::Result<T, Error>;

/// Render process errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, mock device, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (render target, render pass, external image list, etc.)
    InvalidResource(String),

    /// Initialization failed (setup, configuration, lifecycle misuse)
    InitializationFailed(String),

    /// The step graph contains a cycle
    UnsatisfiableDependency(UnsatisfiableDependencyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsatisfiableDependency(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UnsatisfiableDependency(err) => Some(err),
            _ => None,
        }
    }
}

// ===== UNSATISFIABLE DEPENDENCY =====

/// A cycle was found among the ordering constraints of a dependency graph.
///
/// The chain lists the steps of one cycle in forward order: each step comes
/// before the next one, and the last step comes before the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsatisfiableDependencyError {
    chain: Vec<StepId>,
}

impl UnsatisfiableDependencyError {
    pub fn new(chain: Vec<StepId>) -> Self {
        Self { chain }
    }

    /// Steps forming the offending cycle
    pub fn dependency_chain(&self) -> &[StepId] {
        &self.chain
    }
}

impl fmt::Display for UnsatisfiableDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsatisfiable dependency chain: ")?;
        for step in &self.chain {
            write!(f, "{} -> ", step)?;
        }
        match self.chain.first() {
            Some(first) => write!(f, "{}", first),
            None => write!(f, "(empty)"),
        }
    }
}

impl std::error::Error for UnsatisfiableDependencyError {}

impl From<UnsatisfiableDependencyError> for Error {
    fn from(err: UnsatisfiableDependencyError) -> Self {
        Error::UnsatisfiableDependency(err)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
