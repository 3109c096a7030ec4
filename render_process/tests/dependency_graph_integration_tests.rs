//! Integration tests for DependencyGraph sequencing
//!
//! Pure scheduling, no device involved.
//!
//! Run with: cargo test --test dependency_graph_integration_tests

use std::collections::BTreeMap;
use std::sync::Arc;

use render_process::rproc::device::{Extent3d, ImageLayout, ImageUsage, TextureFormat};
use render_process::rproc::target::RenderTargetDescription;
use render_process::rproc::{
    AttachmentReference, DepthAttachment, DependencyGraph, DrawContext, Error, RenderPassDescription,
    RenderPassId, Renderer, RendererId, Result, StepId, Subpass,
};

struct Idle;

impl Renderer for Idle {
    fn name(&self) -> &str {
        "idle"
    }

    fn draw(&self, _ctx: &DrawContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Graph with one color pass (optionally with pooled depth) and one renderer
fn graph_with_pass(depth: bool) -> (DependencyGraph, RenderPassId, RendererId, Arc<dyn Renderer>) {
    let renderer: Arc<dyn Renderer> = Arc::new(Idle);
    let mut graph = DependencyGraph::new();
    let renderer_id = graph.add_renderer(Arc::downgrade(&renderer));
    let target = graph.add_rtarget(RenderTargetDescription::managed(
        Extent3d::flat(128, 128),
        ImageUsage::COLOR_ATTACHMENT,
        TextureFormat::R8G8B8A8_UNORM,
    ));
    let mut subpass = Subpass::new().with_color(AttachmentReference::color(target, ImageLayout::ShaderReadOnly));
    if depth {
        subpass = subpass.with_depth(DepthAttachment::pooled());
    }
    let pass = graph.add_rpass(RenderPassDescription::new("pass").with_subpass(subpass));
    (graph, pass, renderer_id, renderer)
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_integration_every_edge_goes_forward() {
    let (mut graph, pass, renderer, _keep) = graph_with_pass(false);
    let steps: Vec<StepId> = (0..8).map(|_| graph.add_step(pass, renderer).id()).collect();
    let edges = [(0, 3), (1, 3), (3, 4), (2, 5), (5, 4), (4, 6), (0, 7), (6, 7)];
    for (first, then) in edges {
        graph.subgraph(steps[first]).before(steps[then]);
    }

    let sequence = graph.assemble_sequence().unwrap();

    let wave: BTreeMap<StepId, u32> = sequence
        .steps()
        .iter()
        .map(|(id, step)| (*id, step.sequence_index.0))
        .collect();
    assert_eq!(wave.len(), 8);
    for (first, then) in edges {
        assert!(wave[&steps[first]] < wave[&steps[then]], "{} must precede {}", steps[first], steps[then]);
    }
    // Longest chain: 2 -> 5 -> 4 -> 6 -> 7
    assert_eq!(sequence.wave_count(), 5);
}

#[test]
fn test_integration_sequence_is_sorted_by_wave() {
    let (mut graph, pass, renderer, _keep) = graph_with_pass(false);
    let late = graph.add_step(pass, renderer).id();
    let early = graph.add_step(pass, renderer).before(late).id();
    let free = graph.add_step(pass, renderer).id();

    let sequence = graph.assemble_sequence().unwrap();

    let order: Vec<StepId> = sequence.steps().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![early, free, late]);
    let indices: Vec<u32> = sequence.steps().iter().map(|(_, s)| s.sequence_index.0).collect();
    assert!(indices.windows(2).all(|w| w[0] <= w[1]));
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn test_integration_three_step_cycle_is_reported() {
    let (mut graph, pass, renderer, _keep) = graph_with_pass(false);
    let a = graph.add_step(pass, renderer).id();
    let b = graph.add_step(pass, renderer).after(a).id();
    let c = graph.add_step(pass, renderer).after(b).before(a).id();

    let err = graph.assemble_sequence().unwrap_err();

    let mut chain = err.dependency_chain().to_vec();
    chain.sort();
    assert_eq!(chain, vec![a, b, c]);

    let as_error: Error = err.into();
    assert!(as_error.to_string().contains("Unsatisfiable dependency chain"));
}

#[test]
fn test_integration_cycle_behind_valid_steps_excludes_them() {
    let (mut graph, pass, renderer, _keep) = graph_with_pass(false);
    let root = graph.add_step(pass, renderer).id();
    let x = graph.add_step(pass, renderer).after(root).id();
    let y = graph.add_step(pass, renderer).after(x).before(x).id();

    let err = graph.assemble_sequence().unwrap_err();

    let mut chain = err.dependency_chain().to_vec();
    chain.sort();
    assert_eq!(chain, vec![x, y]);
}

// ============================================================================
// Depth images
// ============================================================================

#[test]
fn test_integration_parallel_depth_steps_add_up() {
    let (mut graph, pass, renderer, _keep) = graph_with_pass(true);
    let a = graph.add_step(pass, renderer).id();
    graph.add_step(pass, renderer);
    graph.add_step(pass, renderer).after(a);

    let sequence = graph.assemble_sequence().unwrap();

    assert_eq!(sequence.max_wave_depth_images(), 2);
    assert_eq!(sequence.depth_image_extent(), Extent3d::flat(128, 128));
}
