mod forces;
mod physics;
mod quadtree;

use std::collections::HashMap;
use std::fmt;

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::encode::{VisualNode, encode_nodes};
use super::filter::FilteredGraph;
use physics::{LayoutScratch, step_layout};

const EDGE_WIDTH_MIN: f32 = 1.0;
const EDGE_WIDTH_MAX: f32 = 8.0;

/// Force pass tuning.
#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct LayoutConfig {
    pub(in crate::app) node_repulsion: f32,
    pub(in crate::app) ideal_edge_length: f32,
    pub(in crate::app) edge_elasticity: f32,
    pub(in crate::app) gravity: f32,
    pub(in crate::app) max_iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_repulsion: 180_000.0,
            ideal_edge_length: 160.0,
            edge_elasticity: 0.22,
            gravity: 0.02,
            max_iterations: 2200,
        }
    }
}

pub(in crate::app) struct RenderNode {
    pub(in crate::app) visual: VisualNode,
    pub(in crate::app) world_pos: Vec2,
    velocity: Vec2,
}

impl RenderNode {
    pub(in crate::app) fn radius(&self) -> f32 {
        self.visual.size_px * 0.5
    }

    pub(in crate::app) fn id(&self) -> &str {
        &self.visual.node.id
    }
}

pub(in crate::app) struct RenderEdge {
    pub(in crate::app) source: usize,
    pub(in crate::app) target: usize,
    pub(in crate::app) width: f32,
}

/// Score range of the visible nodes, used to weight edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ScoreExtent {
    pub(in crate::app) min: f64,
    pub(in crate::app) max: f64,
}

impl ScoreExtent {
    const FALLBACK: Self = Self { min: 0.0, max: 1.0 };

    /// Falls back to `[0, 1]` when there is no spread to interpolate over.
    pub(in crate::app) fn of<'a>(scores: impl IntoIterator<Item = &'a f64>) -> Self {
        let (min, max) = scores
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), score| {
                (min.min(*score), max.max(*score))
            });

        if !min.is_finite() || !max.is_finite() || min == max {
            Self::FALLBACK
        } else {
            Self { min, max }
        }
    }

    /// Linear map of `score` into the edge width range, clamped at both ends.
    pub(in crate::app) fn edge_width(self, score: f64) -> f32 {
        let t = ((score - self.min) / (self.max - self.min)).clamp(0.0, 1.0) as f32;
        EDGE_WIDTH_MIN + (EDGE_WIDTH_MAX - EDGE_WIDTH_MIN) * t
    }
}

/// Everything that decides whether the radial push already happened for a view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct LayoutSignature {
    seed_url: String,
    applied_hop: u32,
    top_k: usize,
    node_count: usize,
    edge_count: usize,
}

impl LayoutSignature {
    pub(in crate::app) fn new(filtered: &FilteredGraph, applied_hop: u32, top_k: usize) -> Self {
        Self {
            seed_url: filtered.seed_url.clone(),
            applied_hop,
            top_k,
            node_count: filtered.nodes.len(),
            edge_count: filtered.edges.len(),
        }
    }
}

impl fmt::Display for LayoutSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|hop={}|topK={}|nodes={}|edges={}",
            self.seed_url, self.applied_hop, self.top_k, self.node_count, self.edge_count
        )
    }
}

/// Outward displacement applied to a node at `depth` by the radial push.
pub(in crate::app) fn radial_push_by_depth(depth: u32) -> f32 {
    match depth {
        0 => 0.0,
        1 => 80.0,
        2 => 170.0,
        _ => 250.0,
    }
}

pub(in crate::app) struct RenderGraph {
    pub(in crate::app) nodes: Vec<RenderNode>,
    pub(in crate::app) edges: Vec<RenderEdge>,
    pub(in crate::app) index_by_id: HashMap<String, usize>,
    /// Indices into `edges` touching each node.
    pub(in crate::app) incident: Vec<Vec<usize>>,
    pub(in crate::app) seed_index: Option<usize>,
    iterations: usize,
    stabilized: bool,
    scratch: LayoutScratch,
}

impl RenderGraph {
    /// Lays the filtered view out from scratch. `salt` randomizes the starting positions.
    pub(in crate::app) fn build(filtered: &FilteredGraph, salt: u64) -> Self {
        let visual_nodes = encode_nodes(filtered);
        let spread = (visual_nodes.len() as f32).sqrt() * 60.0 + 80.0;

        let nodes = visual_nodes
            .into_iter()
            .map(|visual| {
                let world_pos = if visual.is_seed {
                    Vec2::ZERO
                } else {
                    let (jx, jy) = stable_pair(&visual.node.id, salt);
                    vec2(jx, jy) * spread
                };
                RenderNode {
                    visual,
                    world_pos,
                    velocity: Vec2::ZERO,
                }
            })
            .collect::<Vec<_>>();

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id().to_owned(), index))
            .collect::<HashMap<_, _>>();
        let seed_index = nodes.iter().position(|node| node.visual.is_seed);
        let score_extent = ScoreExtent::of(nodes.iter().map(|node| &node.visual.node.pagerank));

        let mut incident = vec![Vec::new(); nodes.len()];
        let mut edges = Vec::with_capacity(filtered.edges.len());
        for edge in &filtered.edges {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&edge.source),
                index_by_id.get(&edge.target),
            ) else {
                continue;
            };

            let target_score = nodes[target].visual.node.pagerank;
            let edge_index = edges.len();
            edges.push(RenderEdge {
                source,
                target,
                width: score_extent.edge_width(target_score),
            });
            incident[source].push(edge_index);
            if target != source {
                incident[target].push(edge_index);
            }
        }

        Self {
            nodes,
            edges,
            index_by_id,
            incident,
            seed_index,
            iterations: 0,
            stabilized: false,
            scratch: LayoutScratch::default(),
        }
    }

    pub(in crate::app) fn is_stabilized(&self) -> bool {
        self.stabilized
    }

    /// Runs up to `steps` force iterations. Returns true on the call that stabilizes.
    pub(in crate::app) fn advance(&mut self, config: &LayoutConfig, steps: usize) -> bool {
        if self.stabilized {
            return false;
        }

        for _ in 0..steps {
            if !step_layout(self, config) {
                self.stabilized = true;
                tracing::debug!(iterations = self.iterations, "force layout stabilized");
                return true;
            }
        }
        false
    }

    /// World-space box around every node including its radius.
    pub(in crate::app) fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.nodes.iter().fold(None, |bounds, node| {
            let reach = Vec2::splat(node.radius());
            let (low, high) = (node.world_pos - reach, node.world_pos + reach);
            Some(match bounds {
                None => (low, high),
                Some((min, max)) => (low.min(min), high.max(max)),
            })
        })
    }
}

/// Guards the radial push so each distinct view gets it exactly once.
#[derive(Default)]
pub(in crate::app) struct LayoutEngine {
    pushed_for: Option<LayoutSignature>,
}

impl LayoutEngine {
    pub(in crate::app) fn invalidate(&mut self) {
        self.pushed_for = None;
    }

    /// Moves every non-seed node away from the seed by its depth's push distance.
    /// No-op without a seed, or when this signature was already pushed.
    pub(in crate::app) fn apply_radial_push(
        &mut self,
        graph: &mut RenderGraph,
        signature: &LayoutSignature,
    ) -> bool {
        let Some(seed_index) = graph.seed_index else {
            return false;
        };
        if self.pushed_for.as_ref() == Some(signature) {
            return false;
        }
        self.pushed_for = Some(signature.clone());

        let center = graph.nodes[seed_index].world_pos;
        for node in &mut graph.nodes {
            let push = radial_push_by_depth(node.visual.node.depth);
            if push <= 0.0 {
                continue;
            }

            let offset = node.world_pos - center;
            let length = match offset.length() {
                length if length > 0.0 => length,
                _ => 1.0,
            };
            node.world_pos += offset / length * push;
        }

        tracing::debug!(%signature, "applied radial depth push");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::{GraphEdge, GraphNode};

    fn node(id: &str, depth: u32, pagerank: f64) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            url: format!("https://site-{id}.test/{id}"),
            domain: String::new(),
            depth,
            pagerank,
        }
    }

    fn edge(source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            source: source.to_owned(),
            target: target.to_owned(),
        }
    }

    fn sample_view() -> FilteredGraph {
        let seed = node("seed", 0, 0.4);
        FilteredGraph {
            seed_url: seed.url.clone(),
            seed_node: Some(seed.clone()),
            nodes: vec![
                seed,
                node("a", 1, 0.3),
                node("b", 2, 0.2),
                node("c", 3, 0.1),
                node("d", 5, 0.1),
            ],
            edges: vec![edge("seed", "a"), edge("a", "b"), edge("b", "c"), edge("c", "d")],
        }
    }

    fn positions(graph: &RenderGraph) -> Vec<Vec2> {
        graph.nodes.iter().map(|node| node.world_pos).collect()
    }

    #[test]
    fn push_moves_nodes_outward_by_depth() {
        let view = sample_view();
        let mut graph = RenderGraph::build(&view, 7);
        let before = positions(&graph);
        let center = before[0];

        let mut engine = LayoutEngine::default();
        assert!(engine.apply_radial_push(&mut graph, &LayoutSignature::new(&view, 3, 200)));

        let after = positions(&graph);
        assert_eq!(after[0], before[0], "the seed never moves");
        for (index, depth) in [(1, 1), (2, 2), (3, 3), (4, 5)] {
            let moved = (after[index] - center).length() - (before[index] - center).length();
            let expected = radial_push_by_depth(depth);
            assert!(
                (moved - expected).abs() < 1e-2,
                "node {index} moved {moved}, expected {expected}"
            );
        }
    }

    #[test]
    fn push_is_idempotent_per_signature() {
        let view = sample_view();
        let mut graph = RenderGraph::build(&view, 11);
        let mut engine = LayoutEngine::default();
        let signature = LayoutSignature::new(&view, 2, 200);

        assert!(engine.apply_radial_push(&mut graph, &signature));
        let once = positions(&graph);
        assert!(!engine.apply_radial_push(&mut graph, &signature));
        assert_eq!(positions(&graph), once);

        let changed = LayoutSignature::new(&view, 2, 50);
        assert!(engine.apply_radial_push(&mut graph, &changed));
        assert_ne!(positions(&graph), once);
        let twice = positions(&graph);
        assert!(!engine.apply_radial_push(&mut graph, &changed));
        assert_eq!(positions(&graph), twice);
    }

    #[test]
    fn invalidation_allows_a_new_push() {
        let view = sample_view();
        let mut graph = RenderGraph::build(&view, 3);
        let mut engine = LayoutEngine::default();
        let signature = LayoutSignature::new(&view, 2, 200);

        assert!(engine.apply_radial_push(&mut graph, &signature));
        engine.invalidate();
        assert!(engine.apply_radial_push(&mut graph, &signature));
    }

    #[test]
    fn no_seed_means_no_push() {
        let mut view = sample_view();
        view.seed_node = None;
        let mut graph = RenderGraph::build(&view, 5);
        let before = positions(&graph);

        let mut engine = LayoutEngine::default();
        assert!(!engine.apply_radial_push(&mut graph, &LayoutSignature::new(&view, 2, 200)));
        assert_eq!(positions(&graph), before);
    }

    #[test]
    fn node_on_top_of_seed_is_not_displaced() {
        let view = sample_view();
        let mut graph = RenderGraph::build(&view, 1);
        graph.nodes[1].world_pos = graph.nodes[0].world_pos;

        let mut engine = LayoutEngine::default();
        engine.apply_radial_push(&mut graph, &LayoutSignature::new(&view, 2, 200));

        assert_eq!(graph.nodes[1].world_pos, graph.nodes[0].world_pos);
    }

    #[test]
    fn signature_key_lists_every_component() {
        let view = sample_view();
        let key = LayoutSignature::new(&view, 2, 300).to_string();
        assert_eq!(key, format!("{}|hop=2|topK=300|nodes=5|edges=4", view.seed_url));
    }

    #[test]
    fn edge_width_follows_target_score() {
        let view = sample_view();
        let graph = RenderGraph::build(&view, 9);

        let extent = ScoreExtent::of(view.nodes.iter().map(|node| &node.pagerank));
        assert_eq!(extent, ScoreExtent { min: 0.1, max: 0.4 });
        let widths = graph.edges.iter().map(|edge| edge.width).collect::<Vec<_>>();
        // targets: a (0.3), b (0.2), c (0.1), d (0.1)
        assert!((widths[0] - (1.0 + 7.0 * (2.0 / 3.0))).abs() < 1e-4);
        assert!((widths[1] - (1.0 + 7.0 * (1.0 / 3.0))).abs() < 1e-4);
        assert_eq!(widths[2], 1.0);
        assert_eq!(widths[3], 1.0);
    }

    #[test]
    fn equal_scores_fall_back_to_unit_range() {
        let extent = ScoreExtent::of(&[0.25, 0.25, 0.25]);
        assert_eq!(extent, ScoreExtent { min: 0.0, max: 1.0 });
        assert_eq!(extent.edge_width(0.5), 4.5);
        assert_eq!(ScoreExtent::of(&[]), ScoreExtent { min: 0.0, max: 1.0 });
    }

    #[test]
    fn force_pass_comes_to_rest_within_the_iteration_cap() {
        let view = sample_view();
        let mut graph = RenderGraph::build(&view, 42);
        let config = LayoutConfig {
            max_iterations: 300,
            ..LayoutConfig::default()
        };

        let mut stabilized_calls = 0;
        for _ in 0..100 {
            if graph.advance(&config, 10) {
                stabilized_calls += 1;
            }
        }

        assert!(graph.is_stabilized());
        assert_eq!(stabilized_calls, 1, "stabilization is reported once");
        assert!(graph.iterations <= 300);
        for node in &graph.nodes {
            assert!(node.world_pos.x.is_finite() && node.world_pos.y.is_finite());
        }
    }

    #[test]
    fn bounds_cover_node_radii() {
        let view = sample_view();
        let graph = RenderGraph::build(&view, 2);
        let (min, max) = graph.bounds().expect("non-empty graph");
        for node in &graph.nodes {
            assert!(node.world_pos.x - node.radius() >= min.x - 1e-3);
            assert!(node.world_pos.y + node.radius() <= max.y + 1e-3);
        }
    }
}
