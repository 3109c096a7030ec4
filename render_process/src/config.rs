//! Render process configuration
//!
//! Supplied to `RenderProcess::setup`. The gframe count may later change
//! through `RenderProcess::reset`; the depth format is fixed for the
//! lifetime of a setup.

use crate::error::{Error, Result};
use crate::graphics_device::TextureFormat;

/// Setup parameters of a render process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProcessConfig {
    /// Number of frames in flight (gframes)
    pub gframe_count: usize,
    /// Format of the pooled depth images
    pub depth_format: TextureFormat,
}

impl Default for RenderProcessConfig {
    fn default() -> Self {
        Self {
            gframe_count: 2,
            depth_format: TextureFormat::D32_FLOAT,
        }
    }
}

impl RenderProcessConfig {
    pub fn with_gframe_count(mut self, gframe_count: usize) -> Self {
        self.gframe_count = gframe_count;
        self
    }

    pub fn with_depth_format(mut self, depth_format: TextureFormat) -> Self {
        self.depth_format = depth_format;
        self
    }

    /// Check the configuration before any GPU object is created
    pub fn validate(&self) -> Result<()> {
        if self.gframe_count == 0 {
            return Err(Error::InitializationFailed(
                "gframe_count must be at least 1".to_string(),
            ));
        }
        if !self.depth_format.is_depth() {
            return Err(Error::InitializationFailed(format!(
                "{:?} is not a depth format", self.depth_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RenderProcessConfig::default();
        assert_eq!(config.gframe_count, 2);
        assert_eq!(config.depth_format, TextureFormat::D32_FLOAT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_gframes_is_rejected() {
        let config = RenderProcessConfig::default().with_gframe_count(0);
        assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
    }

    #[test]
    fn test_color_depth_format_is_rejected() {
        let config = RenderProcessConfig::default().with_depth_format(TextureFormat::R8G8B8A8_UNORM);
        assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
    }

    #[test]
    fn test_stencil_depth_format_is_accepted() {
        let config = RenderProcessConfig::default()
            .with_gframe_count(3)
            .with_depth_format(TextureFormat::D24_UNORM_S8_UINT);
        assert!(config.validate().is_ok());
    }
}
