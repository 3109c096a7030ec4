/// Per-wave, per-gframe command buffers and draw synchronization
///
/// Every (wave, gframe) pair owns one command pool with two primary command
/// buffers, one for the prepare stage and one for the draw stage, plus a
/// sync set: a fence and a semaphore for each stage. Fences are created
/// signaled so the first wait of a gframe returns at once.
///
/// Frames are stored wave-major: frame `g` of wave `w` lives at
/// `frames[w * gframe_count + g]`.

use crate::error::Result;
use crate::graphics_device::{
    CommandBufferHandle, CommandPoolDesc, CommandPoolHandle, DeviceCommandPool, DeviceFence,
    DeviceSemaphore, GraphicsDevice, SemaphoreHandle,
};
use crate::ids::SequenceIndex;
use crate::{engine_bail, engine_debug};

/// Command buffers of one wave for one gframe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveCommandBuffers {
    pub pool: CommandPoolHandle,
    pub prepare: CommandBufferHandle,
    pub draw: CommandBufferHandle,
}

/// Fences and semaphores signaled by the prepare and draw submissions of a wave
pub struct DrawSyncPrimitives {
    pub prepare_fence: Box<dyn DeviceFence>,
    pub draw_fence: Box<dyn DeviceFence>,
    pub prepare_semaphore: Box<dyn DeviceSemaphore>,
    pub draw_semaphore: Box<dyn DeviceSemaphore>,
}

impl DrawSyncPrimitives {
    fn create(device: &dyn GraphicsDevice) -> Result<Self> {
        Ok(Self {
            prepare_fence: device.create_fence(true)?,
            draw_fence: device.create_fence(true)?,
            prepare_semaphore: device.create_semaphore()?,
            draw_semaphore: device.create_semaphore()?,
        })
    }

    pub fn semaphores(&self) -> (SemaphoreHandle, SemaphoreHandle) {
        (self.prepare_semaphore.handle(), self.draw_semaphore.handle())
    }

    /// Wait for both stage fences; returns `false` if either timed out
    pub fn wait(&self, timeout_ns: u64) -> Result<bool> {
        Ok(self.prepare_fence.wait(timeout_ns)? && self.draw_fence.wait(timeout_ns)?)
    }
}

/// Everything one wave needs to record and submit one gframe
pub struct WaveFrame {
    pool: Box<dyn DeviceCommandPool>,
    sync: DrawSyncPrimitives,
}

impl WaveFrame {
    fn create(device: &dyn GraphicsDevice, wave: usize, gframe: usize) -> Result<Self> {
        let name = format!("wave#{}[{}]", wave, gframe);
        let pool = device.create_command_pool(&CommandPoolDesc { name: &name, buffer_count: 2 })?;
        if pool.command_buffers().len() < 2 {
            engine_bail!("rproc::RenderProcess",
                "Command pool {} returned {} command buffer(s), 2 required",
                name, pool.command_buffers().len());
        }
        let sync = DrawSyncPrimitives::create(device)?;
        Ok(Self { pool, sync })
    }

    pub fn command_buffers(&self) -> WaveCommandBuffers {
        let buffers = self.pool.command_buffers();
        WaveCommandBuffers {
            pool: self.pool.handle(),
            prepare: buffers[0],
            draw: buffers[1],
        }
    }

    pub fn command_pool(&self) -> &dyn DeviceCommandPool {
        self.pool.as_ref()
    }

    pub fn sync(&self) -> &DrawSyncPrimitives {
        &self.sync
    }
}

/// The wave frames of a render process
pub(crate) struct WaveResources {
    frames: Vec<WaveFrame>,
    wave_count: usize,
    gframe_count: usize,
}

impl WaveResources {
    /// Create `wave_count * gframe_count` frames
    ///
    /// On failure the frames created so far are dropped.
    pub(crate) fn allocate(device: &dyn GraphicsDevice, wave_count: usize, gframe_count: usize) -> Result<Self> {
        let mut frames = Vec::with_capacity(wave_count * gframe_count);
        for wave in 0..wave_count {
            for gframe in 0..gframe_count {
                frames.push(WaveFrame::create(device, wave, gframe)?);
            }
        }
        engine_debug!("rproc::RenderProcess",
            "Created command buffers and sync sets for {} wave(s) x {} gframe(s)", wave_count, gframe_count);
        Ok(Self { frames, wave_count, gframe_count })
    }

    /// Keep the frames of the first `gframe_count` gframes of every wave,
    /// create the missing ones and drop the surplus
    ///
    /// On failure the resources are left empty.
    pub(crate) fn set_gframe_count(&mut self, device: &dyn GraphicsDevice, gframe_count: usize) -> Result<()> {
        if gframe_count == self.gframe_count {
            return Ok(());
        }
        let old_count = self.gframe_count;
        let wave_count = self.wave_count;
        let mut old_frames = std::mem::take(&mut self.frames).into_iter();
        self.gframe_count = 0;
        self.wave_count = 0;

        let mut frames = Vec::with_capacity(wave_count * gframe_count);
        for wave in 0..wave_count {
            let mut kept: Vec<WaveFrame> = old_frames.by_ref().take(old_count).collect();
            kept.truncate(gframe_count);
            frames.extend(kept);
            for gframe in old_count..gframe_count {
                frames.push(WaveFrame::create(device, wave, gframe)?);
            }
        }

        self.frames = frames;
        self.wave_count = wave_count;
        self.gframe_count = gframe_count;
        Ok(())
    }

    pub(crate) fn get(&self, wave: SequenceIndex, gframe: usize) -> Option<&WaveFrame> {
        if gframe >= self.gframe_count {
            return None;
        }
        self.frames.get(wave.0 as usize * self.gframe_count + gframe)
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
#[path = "wave_resources_tests.rs"]
mod tests;
