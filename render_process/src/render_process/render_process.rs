/// RenderProcess - owner of the GPU objects backing a sequenced step graph
///
/// `setup` allocates the render target storage, the depth pool, every
/// render pass with its framebuffers, and the command buffers and sync set
/// of every wave for every gframe. `reset` changes the gframe count or
/// resizes render targets, recreating only what the change affects.
/// `wave_range` walks the steps wave by wave.
///
/// Lifecycle: uninitialized -> (setup) -> ready -> (reset) -> ready ...
/// -> (destroy) -> uninitialized. A failed reset leaves the process broken:
/// it yields no wave and only accepts `destroy`.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use crate::config::RenderProcessConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{Extent3d, GraphicsDevice, Rect2D, TextureFormat};
use crate::ids::{RenderPassId, RenderTargetId, RendererId, SequenceIndex, StepId};
use crate::render_process::dependency_graph::{DependencyGraph, SequenceDescription, Step};
use crate::render_process::depth_pool::{DepthImage, DepthPool, DepthSlotPlan};
use crate::render_process::render_pass::{RenderPass, RenderPassDescription, RenderPassInputs};
use crate::render_process::renderer::{DrawContext, LifecycleEvent, Renderer, StepSetupInfo};
use crate::render_process::wave_iterator::{Wave, WaveCursor, WaveIterator};
use crate::render_process::wave_resources::{DrawSyncPrimitives, WaveCommandBuffers, WaveFrame, WaveResources};
use crate::render_target::{RenderTarget, RenderTargetDescription, RenderTargetStorage};
use crate::{engine_debug, engine_error, engine_info, engine_trace, engine_warn};

// ===== RESET INPUTS & OUTPUTS =====

/// Proof that the device has no work in flight
///
/// Required by `reset`. Obtained by waiting for the device, or asserted by a
/// caller that has already fenced every submission.
#[derive(Debug)]
pub struct GpuDrained {
    _private: (),
}

impl GpuDrained {
    /// Block until `device` is idle
    pub fn wait_idle(device: &dyn GraphicsDevice) -> Result<Self> {
        device.wait_idle()?;
        Ok(Self { _private: () })
    }

    /// Assert that no submitted work still uses the render process's objects
    ///
    /// # Safety
    ///
    /// The caller must have waited for every submission that references a
    /// render pass, framebuffer or image of the render process.
    pub unsafe fn assume_drained() -> Self {
        Self { _private: () }
    }
}

/// New extent for a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtargetResizeInfo {
    pub rtarget: RenderTargetId,
    pub new_extent: Extent3d,
}

/// What a `reset` actually recreated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub recreated_render_passes: Vec<RenderPassId>,
    pub recreated_depth_pool: bool,
    pub resized_targets: Vec<RenderTargetId>,
    pub gframe_count_changed: bool,
}

impl ResetReport {
    /// Whether the reset touched no GPU object
    pub fn is_noop(&self) -> bool {
        self.recreated_render_passes.is_empty()
            && !self.recreated_depth_pool
            && self.resized_targets.is_empty()
            && !self.gframe_count_changed
    }
}

// ===== STATE =====

/// Everything owned between `setup` and `destroy`
///
/// Field order is drop order: command buffers go first, then render passes
/// (and their framebuffers) before the depth pool and the render targets
/// their views come from.
struct ProcessState {
    wave_resources: WaveResources,
    render_passes: Vec<Option<RenderPass>>,
    depth_pool: DepthPool,
    rtarget_storage: RenderTargetStorage,
    rpass_descriptions: Vec<RenderPassDescription>,
    steps: Vec<(StepId, Step)>,
    /// Position in `steps` of each step, by step index
    step_positions: Vec<usize>,
    renderers: Vec<Weak<dyn Renderer>>,
    depth_plan: DepthSlotPlan,
    pending_resizes: Vec<RtargetResizeInfo>,
    gframe_count: usize,
    depth_format: TextureFormat,
    broken: bool,
    device: Arc<dyn GraphicsDevice>,
}

/// Render graph executor
pub struct RenderProcess {
    state: Option<ProcessState>,
    wave_validity: u64,
}

impl Default for RenderProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderProcess {
    pub fn new() -> Self {
        Self { state: None, wave_validity: 0 }
    }

    // ===== LIFECYCLE =====

    /// Allocate every GPU object of `sequence`
    ///
    /// On failure every object created so far is released and the process
    /// stays uninitialized.
    pub fn setup(
        &mut self,
        device: Arc<dyn GraphicsDevice>,
        config: &RenderProcessConfig,
        sequence: SequenceDescription,
    ) -> Result<()> {
        if self.state.is_some() {
            return Err(Error::InitializationFailed(
                "render process is already set up".to_string(),
            ));
        }
        config.validate()?;

        let SequenceDescription {
            steps,
            rtargets,
            rpasses,
            renderers,
            max_wave_depth_images,
            ..
        } = sequence;
        let rtarget_count = rtargets.len();

        let rtarget_storage = rtargets.finalize(device.as_ref(), config.gframe_count)?;

        let depth_counts: Vec<u32> = rpasses.iter().map(|r| r.pooled_depth_count()).collect();
        let depth_plan = DepthSlotPlan::plan(&steps, &depth_counts, max_wave_depth_images as usize);
        let depth_pool = DepthPool::allocate(
            device.as_ref(),
            config.depth_format,
            pool_extent(&rpasses, &rtarget_storage),
            depth_plan.pool_size(),
            config.gframe_count,
        )?;

        let mut render_passes = Vec::with_capacity(rpasses.len());
        for (index, desc) in rpasses.iter().enumerate() {
            let id = RenderPassId::from_index(index);
            let inputs = RenderPassInputs {
                storage: &rtarget_storage,
                depth_pool: &depth_pool,
                depth_base: depth_plan.base(id),
                depth_format: config.depth_format,
            };
            render_passes.push(Some(RenderPass::compile(device.as_ref(), id, desc, &inputs)?));
        }

        let wave_resources = WaveResources::allocate(device.as_ref(), wave_count_of(&steps), config.gframe_count)?;

        let mut step_positions = vec![0; steps.len()];
        for (position, (id, _)) in steps.iter().enumerate() {
            step_positions[id.index()] = position;
        }

        let state = ProcessState {
            wave_resources,
            render_passes,
            depth_pool,
            rtarget_storage,
            rpass_descriptions: rpasses,
            steps,
            step_positions,
            renderers,
            depth_plan,
            pending_resizes: Vec::new(),
            gframe_count: config.gframe_count,
            depth_format: config.depth_format,
            broken: false,
            device,
        };

        engine_info!("rproc::RenderProcess",
            "Set up {} step(s) in {} wave(s): {} render target(s), {} render pass(es), {} pooled depth image(s), {} wave frame(s), {} gframe(s)",
            state.steps.len(), state.wave_count(), rtarget_count, state.render_passes.len(),
            state.depth_plan.pool_size(), state.wave_resources.len(), state.gframe_count);

        state.notify_attach(LifecycleEvent::Setup, None);
        self.state = Some(state);
        self.wave_validity += 1;
        Ok(())
    }

    /// Assemble `graph` and set up the result
    pub fn setup_from_graph(
        &mut self,
        device: Arc<dyn GraphicsDevice>,
        config: &RenderProcessConfig,
        graph: &DependencyGraph,
    ) -> Result<()> {
        let sequence = graph.assemble_sequence()?;
        self.setup(device, config, sequence)
    }

    /// Wait for the device and return the token `reset` needs
    pub fn drain(&self) -> Result<GpuDrained> {
        let state = self.state.as_ref().ok_or_else(not_set_up)?;
        GpuDrained::wait_idle(state.device.as_ref())
    }

    /// Change the gframe count and/or resize render targets
    ///
    /// Resizes queued with `set_rtarget_extent` are applied together with
    /// `resizes`. Nothing is recreated when neither the gframe count nor any
    /// extent actually changes.
    pub fn reset(
        &mut self,
        _drained: GpuDrained,
        new_gframe_count: usize,
        resizes: &[RtargetResizeInfo],
    ) -> Result<ResetReport> {
        let state = self.state.as_mut().ok_or_else(not_set_up)?;
        if state.broken {
            return Err(Error::InitializationFailed(
                "render process is broken by a failed reset; destroy it".to_string(),
            ));
        }
        if new_gframe_count == 0 {
            return Err(Error::InitializationFailed(
                "gframe_count must be at least 1".to_string(),
            ));
        }

        self.wave_validity += 1;
        let result = state.reset(new_gframe_count, resizes);
        if let Err(e) = &result {
            state.broken = true;
            engine_error!("rproc::RenderProcess", "Reset failed, render process is broken: {}", e);
        }
        result
    }

    /// Queue a render target resize for the next `reset`
    pub fn set_rtarget_extent(&mut self, rtarget: RenderTargetId, new_extent: Extent3d) -> Result<()> {
        let state = self.state.as_mut().ok_or_else(not_set_up)?;
        debug_assert!(rtarget.index() < state.rtarget_storage.len(), "unregistered {}", rtarget);
        state.pending_resizes.push(RtargetResizeInfo { rtarget, new_extent });
        Ok(())
    }

    /// Release every GPU object
    ///
    /// Waits for the device first; objects are released even if the wait
    /// fails, in which case the wait error is returned.
    pub fn destroy(&mut self) -> Result<()> {
        let Some(state) = self.state.take() else {
            return Ok(());
        };
        self.wave_validity += 1;

        let waited = state.device.wait_idle();
        if let Err(e) = &waited {
            engine_error!("rproc::RenderProcess",
                "Failed to wait for the device before destroying, destroying anyway: {}", e);
        }

        state.notify_detach(LifecycleEvent::Destroy, None);
        let step_count = state.steps.len();
        drop(state);

        engine_info!("rproc::RenderProcess", "Destroyed render process ({} step(s))", step_count);
        waited
    }

    // ===== WAVES =====

    /// Iterate the waves in order
    ///
    /// Yields nothing when the process is not ready.
    pub fn wave_range(&self) -> WaveIterator<'_> {
        match self.ready_state() {
            Some(state) => WaveIterator::new(&state.steps, self.wave_validity),
            None => WaveIterator::empty(self.wave_validity),
        }
    }

    /// Turn a cursor back into a wave
    ///
    /// A cursor taken before the latest setup/reset is a programmer error.
    pub fn resolve_wave(&self, cursor: WaveCursor) -> Option<Wave<'_>> {
        debug_assert_eq!(cursor.validity, self.wave_validity, "stale wave cursor");
        if cursor.validity != self.wave_validity {
            return None;
        }
        let state = self.ready_state()?;
        WaveIterator::wave_at(&state.steps, cursor.start, cursor.len, cursor.validity)
    }

    /// Stamp of the latest setup/reset/destroy
    pub fn wave_validity(&self) -> u64 {
        self.wave_validity
    }

    /// Let the renderer of every step of `wave` record its prepare work for
    /// `gframe` into the wave's prepare command buffer
    ///
    /// Dummy steps and steps whose renderer was dropped are skipped. Returns
    /// how many steps were prepared.
    pub fn prepare_wave(&self, wave: &Wave<'_>, gframe: usize) -> Result<usize> {
        self.record_wave(wave, gframe, Stage::Prepare)
    }

    /// Let the renderer of every step of `wave` record it for `gframe` into
    /// the wave's draw command buffer
    ///
    /// Dummy steps and steps whose renderer was dropped are skipped. Returns
    /// how many steps were drawn.
    pub fn draw_wave(&self, wave: &Wave<'_>, gframe: usize) -> Result<usize> {
        self.record_wave(wave, gframe, Stage::Draw)
    }

    fn record_wave(&self, wave: &Wave<'_>, gframe: usize, stage: Stage) -> Result<usize> {
        debug_assert_eq!(wave.validity(), self.wave_validity, "stale wave");
        let state = self.ready_state().ok_or_else(not_set_up)?;
        if gframe >= state.gframe_count {
            return Err(Error::InvalidResource(format!(
                "gframe {} out of {}", gframe, state.gframe_count
            )));
        }
        let commands = state
            .wave_resources
            .get(wave.sequence_index(), gframe)
            .map(WaveFrame::command_buffers)
            .ok_or_else(|| Error::InvalidResource(format!(
                "{} has no command buffers for gframe {}", wave.sequence_index(), gframe
            )))?;
        let command_buffer = match stage {
            Stage::Prepare => commands.prepare,
            Stage::Draw => commands.draw,
        };

        let mut recorded = 0;
        for (step_id, step) in wave.steps() {
            let (Some(rpass_id), Some(renderer_id)) = (step.render_pass, step.renderer) else {
                continue;
            };
            let Some(renderer) = state.renderer(renderer_id) else {
                engine_trace!("rproc::RenderProcess", "Skipping {}: {} was dropped", step_id, renderer_id);
                continue;
            };
            let rpass = state.render_pass(rpass_id).ok_or_else(|| {
                Error::InvalidResource(format!("{} has no compiled render pass", rpass_id))
            })?;
            let framebuffer = rpass.framebuffer(gframe).ok_or_else(|| {
                Error::InvalidResource(format!("{} has no framebuffer for gframe {}", rpass_id, gframe))
            })?;

            let ctx = DrawContext {
                gframe_index: gframe,
                command_buffer,
                step_id: *step_id,
                step,
                render_pass: rpass.handle(),
                framebuffer,
                render_area: step.render_area,
                clear_values: &step.clear_values,
                depth_images: state.step_depth_images(step, gframe),
            };
            match stage {
                Stage::Prepare => renderer.prepare(&ctx)?,
                Stage::Draw => renderer.draw(&ctx)?,
            }
            recorded += 1;
        }
        Ok(recorded)
    }

    // ===== ACCESSORS =====

    /// Set up and not broken
    pub fn is_ready(&self) -> bool {
        self.ready_state().is_some()
    }

    /// A reset failed; only `destroy` is accepted
    pub fn is_broken(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.broken)
    }

    pub fn gframe_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.gframe_count)
    }

    pub fn wave_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.wave_count())
    }

    pub fn get_step(&self, id: StepId) -> Option<&Step> {
        self.state.as_ref()?.step(id)
    }

    pub fn get_render_target(&self, id: RenderTargetId, gframe: usize) -> Option<&RenderTarget> {
        self.state.as_ref()?.rtarget_storage.entry(id, gframe)
    }

    pub fn get_render_target_description(&self, id: RenderTargetId) -> Option<&RenderTargetDescription> {
        self.state.as_ref()?.rtarget_storage.descriptions().get(id.index())
    }

    pub fn get_render_pass(&self, id: RenderPassId) -> Option<&RenderPass> {
        self.state.as_ref()?.render_pass(id)
    }

    pub fn get_render_pass_description(&self, id: RenderPassId) -> Option<&RenderPassDescription> {
        self.state.as_ref()?.rpass_descriptions.get(id.index())
    }

    /// Strong reference to a renderer, if it is still alive
    pub fn get_renderer(&self, id: RendererId) -> Option<Arc<dyn Renderer>> {
        self.state.as_ref()?.renderer(id)
    }

    /// Pooled depth images of a step for `gframe`
    pub fn get_step_depth_images(&self, id: StepId, gframe: usize) -> &[DepthImage] {
        let Some(state) = self.state.as_ref() else {
            return &[];
        };
        match state.step(id) {
            Some(step) if gframe < state.gframe_count => state.step_depth_images(step, gframe),
            _ => &[],
        }
    }

    /// Command pool, command buffers and sync set of `wave` for `gframe`
    pub fn get_wave_frame(&self, wave: SequenceIndex, gframe: usize) -> Option<&WaveFrame> {
        self.ready_state()?.wave_resources.get(wave, gframe)
    }

    pub fn get_wave_command_buffers(&self, wave: SequenceIndex, gframe: usize) -> Option<WaveCommandBuffers> {
        self.get_wave_frame(wave, gframe).map(WaveFrame::command_buffers)
    }

    pub fn get_draw_sync_primitives(&self, wave: SequenceIndex, gframe: usize) -> Option<&DrawSyncPrimitives> {
        self.get_wave_frame(wave, gframe).map(WaveFrame::sync)
    }

    /// Depth images per gframe in the shared pool
    pub fn depth_pool_size(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.depth_pool.size())
    }

    fn ready_state(&self) -> Option<&ProcessState> {
        self.state.as_ref().filter(|s| !s.broken)
    }
}

impl Drop for RenderProcess {
    fn drop(&mut self) {
        if self.state.is_some() {
            let _ = self.destroy();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Prepare,
    Draw,
}

fn not_set_up() -> Error {
    Error::InitializationFailed("render process is not set up".to_string())
}

/// Extent the pooled depth images need: the largest framebuffer among
/// render passes with pooled depth
fn pool_extent(rpasses: &[RenderPassDescription], storage: &RenderTargetStorage) -> Extent3d {
    rpasses
        .iter()
        .filter(|r| r.pooled_depth_count() > 0)
        .map(|r| r.effective_extent(|rt| storage.description(rt).extent))
        .fold(Extent3d::default(), Extent3d::max)
}

// ===== STATE OPERATIONS =====

fn wave_count_of(steps: &[(StepId, Step)]) -> usize {
    steps.last().map_or(0, |(_, s)| s.sequence_index.0 as usize + 1)
}

impl ProcessState {
    fn wave_count(&self) -> usize {
        wave_count_of(&self.steps)
    }

    fn step(&self, id: StepId) -> Option<&Step> {
        let position = *self.step_positions.get(id.index())?;
        self.steps.get(position).map(|(_, step)| step)
    }

    fn render_pass(&self, id: RenderPassId) -> Option<&RenderPass> {
        self.render_passes.get(id.index())?.as_ref()
    }

    fn renderer(&self, id: RendererId) -> Option<Arc<dyn Renderer>> {
        self.renderers.get(id.index())?.upgrade()
    }

    fn step_depth_images(&self, step: &Step, gframe: usize) -> &[DepthImage] {
        match step.render_pass {
            Some(rpass) if step.depth_image_count > 0 => self
                .depth_pool
                .images(gframe, self.depth_plan.range(rpass, step.depth_image_count)),
            _ => &[],
        }
    }

    /// Live renderers referenced by at least one step, in step order
    fn unique_renderers(&self) -> Vec<(RendererId, Arc<dyn Renderer>)> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for (step_id, step) in &self.steps {
            let Some(id) = step.renderer else { continue };
            if !seen.insert(id) {
                continue;
            }
            match self.renderer(id) {
                Some(renderer) => out.push((id, renderer)),
                None => engine_trace!("rproc::RenderProcess",
                    "Not notifying {} of {}: renderer was dropped", id, step_id),
            }
        }
        out
    }

    /// Steps whose render pass is compiled and whose renderer is alive,
    /// restricted to `only` when given
    fn step_setups(&self, only: Option<&BTreeSet<RenderPassId>>) -> Vec<(Arc<dyn Renderer>, StepSetupInfo)> {
        self.steps
            .iter()
            .filter_map(|(step_id, step)| {
                let rpass_id = step.render_pass?;
                if only.is_some_and(|set| !set.contains(&rpass_id)) {
                    return None;
                }
                let rpass = self.render_pass(rpass_id)?;
                let renderer = self.renderer(step.renderer?)?;
                Some((renderer, StepSetupInfo {
                    step_id: *step_id,
                    render_pass_id: rpass_id,
                    render_pass: rpass.handle(),
                    extent: rpass.extent(),
                }))
            })
            .collect()
    }

    fn notify_attach(&self, event: LifecycleEvent, only: Option<&BTreeSet<RenderPassId>>) {
        for (id, renderer) in self.unique_renderers() {
            engine_trace!("rproc::RenderProcess", "Attaching {} '{}' ({:?})", id, renderer.name(), event);
            renderer.attach(event, self.gframe_count);
        }
        for (renderer, info) in self.step_setups(only) {
            renderer.prepare_step(&info);
        }
    }

    fn notify_detach(&self, event: LifecycleEvent, only: Option<&BTreeSet<RenderPassId>>) {
        for (renderer, info) in self.step_setups(only) {
            renderer.forget_step(&info);
        }
        for (id, renderer) in self.unique_renderers() {
            engine_trace!("rproc::RenderProcess", "Detaching {} '{}' ({:?})", id, renderer.name(), event);
            renderer.detach(event);
        }
    }

    fn reset(&mut self, new_gframe_count: usize, resizes: &[RtargetResizeInfo]) -> Result<ResetReport> {
        let mut requested = std::mem::take(&mut self.pending_resizes);
        requested.extend_from_slice(resizes);

        for resize in &requested {
            debug_assert!(resize.rtarget.index() < self.rtarget_storage.len(), "unregistered {}", resize.rtarget);
            self.rtarget_storage.set_rtarget_extent(resize.rtarget, resize.new_extent);
        }

        // Only targets whose entries no longer match their description
        let resized: BTreeSet<RenderTargetId> = requested
            .iter()
            .map(|r| r.rtarget)
            .filter(|&id| {
                let set = self.rtarget_storage.entry_set(id);
                set.get(0).map_or(false, |e| e.extent() != self.rtarget_storage.description(id).extent)
            })
            .collect();
        let gframe_count_changed = new_gframe_count != self.gframe_count;

        if resized.is_empty() && !gframe_count_changed {
            engine_trace!("rproc::RenderProcess", "Reset without changes, nothing recreated");
            return Ok(ResetReport::default());
        }

        let new_pool_extent = pool_extent(&self.rpass_descriptions, &self.rtarget_storage);
        let pool_changed = gframe_count_changed || new_pool_extent != self.depth_pool.extent();

        let affected: BTreeSet<RenderPassId> = self
            .rpass_descriptions
            .iter()
            .enumerate()
            .filter(|(_, desc)| {
                gframe_count_changed
                    || resized.iter().any(|&rt| desc.references(rt))
                    || (pool_changed && desc.pooled_depth_count() > 0)
            })
            .map(|(index, _)| RenderPassId::from_index(index))
            .collect();

        engine_debug!("rproc::RenderProcess",
            "Reset: gframes {} -> {}, {} resized target(s), {} render pass(es) to recreate{}",
            self.gframe_count, new_gframe_count, resized.len(), affected.len(),
            if pool_changed { ", depth pool reallocated" } else { "" });

        self.notify_detach(LifecycleEvent::Reset, Some(&affected));
        for id in &affected {
            self.render_passes[id.index()] = None;
        }

        // External targets are re-read from their shared lists below, which
        // already hold the new gframe count's worth of images
        let device = Arc::clone(&self.device);
        for &id in resized.iter() {
            if self.rtarget_storage.description(id).is_external() {
                continue;
            }
            self.rtarget_storage.recreate_entries(device.as_ref(), id)?;
        }
        if gframe_count_changed {
            self.rtarget_storage.set_gframe_count(device.as_ref(), new_gframe_count)?;
            self.wave_resources.set_gframe_count(device.as_ref(), new_gframe_count)?;
        }
        self.rtarget_storage.update_external_references()?;
        self.gframe_count = new_gframe_count;

        if pool_changed {
            self.depth_pool = DepthPool::empty();
            self.depth_pool = DepthPool::allocate(
                device.as_ref(),
                self.depth_format,
                new_pool_extent,
                self.depth_plan.pool_size(),
                new_gframe_count,
            )?;
        }

        for &id in &affected {
            let inputs = RenderPassInputs {
                storage: &self.rtarget_storage,
                depth_pool: &self.depth_pool,
                depth_base: self.depth_plan.base(id),
                depth_format: self.depth_format,
            };
            let compiled = RenderPass::compile(device.as_ref(), id, &self.rpass_descriptions[id.index()], &inputs)?;
            self.render_passes[id.index()] = Some(compiled);
        }

        for (_, step) in &mut self.steps {
            let Some(rpass_id) = step.render_pass.filter(|id| affected.contains(id)) else {
                continue;
            };
            let Some(extent) = self.render_passes[rpass_id.index()].as_ref().map(RenderPass::extent) else {
                continue;
            };
            if step.fit_render_area {
                step.render_area = Rect2D::sized(extent.width, extent.height);
            }
            if step.depth_image_count > 0 {
                step.depth_image_extent = extent;
            }
        }

        if self.render_passes.iter().any(Option::is_none) {
            engine_warn!("rproc::RenderProcess", "Render pass missing after reset");
        }

        self.notify_attach(LifecycleEvent::Reset, Some(&affected));

        Ok(ResetReport {
            recreated_render_passes: affected.into_iter().collect(),
            recreated_depth_pool: pool_changed,
            resized_targets: resized.into_iter().collect(),
            gframe_count_changed,
        })
    }
}

#[cfg(test)]
#[path = "render_process_tests.rs"]
mod tests;
