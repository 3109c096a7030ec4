/// Dependency graph - declaration of render targets, render passes,
/// renderers and steps, and their compilation into a wave sequence
///
/// Steps pair a render pass with a renderer. Ordering constraints between
/// steps are added through `Subgraph::before` / `Subgraph::after`.
/// `assemble_sequence` groups the steps into waves: every step lands in the
/// first wave that comes after all of its predecessors' waves.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Weak;

use crate::error::UnsatisfiableDependencyError;
use crate::graphics_device::{ClearValue, Extent3d, Rect2D};
use crate::ids::{RenderPassId, RenderTargetId, RendererId, SequenceIndex, StepId};
use crate::render_process::graph_loop::detect_graph_loop;
use crate::render_process::render_pass::RenderPassDescription;
use crate::render_process::renderer::Renderer;
use crate::render_target::{RenderTargetDescription, RenderTargetStorageFactory};
use crate::{engine_debug, engine_warn};

// ===== STEPS =====

/// A step as declared, before sequencing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDescription {
    /// `None` for a dummy step
    pub render_pass: Option<RenderPassId>,
    /// `None` for a dummy step
    pub renderer: Option<RendererId>,
    /// Defaults to the whole framebuffer
    pub render_area: Option<Rect2D>,
    /// One per attachment, in attachment order
    pub clear_values: Vec<ClearValue>,
}

impl StepDescription {
    pub fn new(render_pass: RenderPassId, renderer: RendererId) -> Self {
        Self {
            render_pass: Some(render_pass),
            renderer: Some(renderer),
            render_area: None,
            clear_values: Vec::new(),
        }
    }

    /// Step that draws nothing and only carries ordering constraints
    pub fn dummy() -> Self {
        Self::default()
    }

    pub fn with_render_area(mut self, render_area: Rect2D) -> Self {
        self.render_area = Some(render_area);
        self
    }

    pub fn with_clear_values(mut self, clear_values: Vec<ClearValue>) -> Self {
        self.clear_values = clear_values;
        self
    }

    pub fn is_dummy(&self) -> bool {
        self.render_pass.is_none()
    }
}

/// A sequenced step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Wave the step belongs to
    pub sequence_index: SequenceIndex,
    pub render_pass: Option<RenderPassId>,
    pub renderer: Option<RendererId>,
    pub render_area: Rect2D,
    /// The render area follows the framebuffer size across resizes
    pub fit_render_area: bool,
    pub clear_values: Vec<ClearValue>,
    /// Pooled depth images the step's render pass needs
    pub depth_image_count: u32,
    /// Size the pooled depth images must have
    pub depth_image_extent: Extent3d,
}

impl Step {
    pub fn is_dummy(&self) -> bool {
        self.render_pass.is_none()
    }
}

// ===== SEQUENCE =====

/// Output of `DependencyGraph::assemble_sequence`, input of `RenderProcess::setup`
#[derive(Clone)]
pub struct SequenceDescription {
    /// Steps sorted by wave, then by id
    pub(crate) steps: Vec<(StepId, Step)>,
    pub(crate) rtargets: RenderTargetStorageFactory,
    pub(crate) rpasses: Vec<RenderPassDescription>,
    pub(crate) renderers: Vec<Weak<dyn Renderer>>,
    pub(crate) max_wave_depth_images: u32,
    pub(crate) depth_image_extent: Extent3d,
}

impl fmt::Debug for SequenceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceDescription")
            .field("steps", &self.steps.len())
            .field("rtargets", &self.rtargets.len())
            .field("rpasses", &self.rpasses.len())
            .field("renderers", &self.renderers.len())
            .field("max_wave_depth_images", &self.max_wave_depth_images)
            .field("depth_image_extent", &self.depth_image_extent)
            .finish()
    }
}

impl SequenceDescription {
    pub fn steps(&self) -> &[(StepId, Step)] {
        &self.steps
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|(s, _)| *s == id).map(|(_, step)| step)
    }

    pub fn rtargets(&self) -> &RenderTargetStorageFactory {
        &self.rtargets
    }

    pub fn rpasses(&self) -> &[RenderPassDescription] {
        &self.rpasses
    }

    pub fn renderers(&self) -> &[Weak<dyn Renderer>] {
        &self.renderers
    }

    /// Largest total of pooled depth images needed by a single wave
    pub fn max_wave_depth_images(&self) -> u32 {
        self.max_wave_depth_images
    }

    /// Largest pooled depth image extent over all steps
    pub fn depth_image_extent(&self) -> Extent3d {
        self.depth_image_extent
    }

    pub fn wave_count(&self) -> usize {
        self.steps.last().map_or(0, |(_, s)| s.sequence_index.0 as usize + 1)
    }
}

// ===== GRAPH =====

/// Builder of a render process
#[derive(Default)]
pub struct DependencyGraph {
    rtargets: RenderTargetStorageFactory,
    rpasses: Vec<RenderPassDescription>,
    renderers: Vec<Weak<dyn Renderer>>,
    steps: Vec<StepDescription>,
    /// `forward[a]` holds every step `a` comes before
    forward: BTreeMap<StepId, BTreeSet<StepId>>,
    /// `backward[b]` holds every step `b` comes after
    backward: BTreeMap<StepId, BTreeSet<StepId>>,
}

/// Handle on one step of a graph, for adding ordering constraints
pub struct Subgraph<'g> {
    graph: &'g mut DependencyGraph,
    step: StepId,
}

impl<'g> Subgraph<'g> {
    pub fn id(&self) -> StepId {
        self.step
    }

    /// This step comes before `other`
    pub fn before(&mut self, other: StepId) -> &mut Self {
        self.graph.add_edge(self.step, other);
        self
    }

    /// This step comes after `other`
    pub fn after(&mut self, other: StepId) -> &mut Self {
        self.graph.add_edge(other, self.step);
        self
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rtarget(&mut self, desc: RenderTargetDescription) -> RenderTargetId {
        self.rtargets.set_render_target(desc)
    }

    pub fn add_rpass(&mut self, desc: RenderPassDescription) -> RenderPassId {
        debug_assert!(
            desc.referenced_rtargets().all(|rt| rt.index() < self.rtargets.len()),
            "render pass '{}' references an unregistered render target", desc.name
        );
        self.rpasses.push(desc);
        RenderPassId::from_index(self.rpasses.len() - 1)
    }

    pub fn add_renderer(&mut self, renderer: Weak<dyn Renderer>) -> RendererId {
        self.renderers.push(renderer);
        RendererId::from_index(self.renderers.len() - 1)
    }

    /// Declare a step drawing `renderer` into `render_pass`
    pub fn add_step(&mut self, render_pass: RenderPassId, renderer: RendererId) -> Subgraph<'_> {
        self.add_step_desc(StepDescription::new(render_pass, renderer))
    }

    /// Declare a step that only carries ordering constraints
    pub fn add_dummy_step(&mut self) -> Subgraph<'_> {
        self.add_step_desc(StepDescription::dummy())
    }

    pub fn add_step_desc(&mut self, desc: StepDescription) -> Subgraph<'_> {
        debug_assert!(
            desc.render_pass.map_or(true, |rp| rp.index() < self.rpasses.len()),
            "step references an unregistered render pass"
        );
        debug_assert!(
            desc.renderer.map_or(true, |r| r.index() < self.renderers.len()),
            "step references an unregistered renderer"
        );
        let step = StepId::from_index(self.steps.len());
        self.steps.push(desc);
        self.forward.insert(step, BTreeSet::new());
        self.backward.insert(step, BTreeSet::new());
        Subgraph { graph: self, step }
    }

    /// Re-open the handle of an existing step
    pub fn subgraph(&mut self, step: StepId) -> Subgraph<'_> {
        debug_assert!(step.index() < self.steps.len(), "unregistered {}", step);
        Subgraph { graph: self, step }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn rtarget_description(&self, id: RenderTargetId) -> Option<&RenderTargetDescription> {
        self.rtargets.description(id)
    }

    pub fn rpass_description(&self, id: RenderPassId) -> Option<&RenderPassDescription> {
        self.rpasses.get(id.index())
    }

    fn add_edge(&mut self, first: StepId, then: StepId) {
        debug_assert!(first.index() < self.steps.len(), "unregistered {}", first);
        debug_assert!(then.index() < self.steps.len(), "unregistered {}", then);
        self.forward.entry(first).or_default().insert(then);
        self.backward.entry(then).or_default().insert(first);
    }

    /// Group the steps into waves
    ///
    /// Fails if the ordering constraints contain a cycle; the error carries
    /// the steps of one such cycle.
    pub fn assemble_sequence(&self) -> Result<SequenceDescription, UnsatisfiableDependencyError> {
        let mut resolved: BTreeSet<StepId> = BTreeSet::new();
        let mut unresolved: BTreeSet<StepId> =
            (0..self.steps.len()).map(StepId::from_index).collect();
        let mut steps = Vec::with_capacity(self.steps.len());
        let mut max_wave_depth_images = 0;
        let mut depth_image_extent = Extent3d::default();
        let mut wave = 0u32;

        while !unresolved.is_empty() {
            let ready: Vec<StepId> = unresolved
                .iter()
                .copied()
                .filter(|id| {
                    self.backward
                        .get(id)
                        .map_or(true, |deps| deps.iter().all(|dep| resolved.contains(dep)))
                })
                .collect();

            if ready.is_empty() {
                let chain = detect_graph_loop(&self.forward, &unresolved);
                engine_warn!("rproc::DependencyGraph",
                    "{} step(s) cannot be sequenced after {} wave(s); cycle through {} step(s)",
                    unresolved.len(), wave, chain.len());
                return Err(UnsatisfiableDependencyError::new(chain));
            }

            let mut wave_depth_images = 0;
            for &id in &ready {
                let step = self.sequence_step(id, SequenceIndex(wave));
                if step.depth_image_count > 0 {
                    wave_depth_images += step.depth_image_count;
                    depth_image_extent = depth_image_extent.max(step.depth_image_extent);
                }
                unresolved.remove(&id);
                steps.push((id, step));
            }
            resolved.extend(ready);
            max_wave_depth_images = max_wave_depth_images.max(wave_depth_images);
            wave += 1;
        }

        engine_debug!("rproc::DependencyGraph",
            "Assembled {} step(s) into {} wave(s), up to {} pooled depth image(s) per wave",
            steps.len(), wave, max_wave_depth_images);

        Ok(SequenceDescription {
            steps,
            rtargets: self.rtargets.clone(),
            rpasses: self.rpasses.clone(),
            renderers: self.renderers.clone(),
            max_wave_depth_images,
            depth_image_extent,
        })
    }

    fn sequence_step(&self, id: StepId, sequence_index: SequenceIndex) -> Step {
        let desc = &self.steps[id.index()];
        let rpass = desc.render_pass.and_then(|rp| self.rpasses.get(rp.index()));

        let (depth_image_count, extent) = match rpass {
            Some(rpass) => (
                rpass.pooled_depth_count(),
                rpass.effective_extent(|rt| {
                    self.rtargets.description(rt).map(|d| d.extent).unwrap_or_default()
                }),
            ),
            None => (0, Extent3d::default()),
        };

        Step {
            sequence_index,
            render_pass: desc.render_pass,
            renderer: desc.renderer,
            render_area: desc
                .render_area
                .unwrap_or_else(|| Rect2D::sized(extent.width, extent.height)),
            fit_render_area: desc.render_area.is_none() && rpass.is_some(),
            clear_values: desc.clear_values.clone(),
            depth_image_count,
            depth_image_extent: if depth_image_count > 0 { extent } else { Extent3d::default() },
        }
    }
}

#[cfg(test)]
#[path = "dependency_graph_tests.rs"]
mod tests;
