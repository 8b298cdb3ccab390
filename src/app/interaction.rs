use std::collections::HashSet;

use eframe::egui::{Pos2, Vec2, vec2};

use super::layout::RenderGraph;

const TOOLTIP_OFFSET: Vec2 = vec2(12.0, 12.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Emphasis {
    Normal,
    Emphasized,
    Dimmed,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Tooltip {
    pub(in crate::app) node_index: usize,
    pub(in crate::app) text: String,
    pub(in crate::app) position: Pos2,
}

/// Selection and hover state for the canvas. Indices refer to the current
/// [`RenderGraph`]; call [`InteractionController::reset`] whenever it is rebuilt.
#[derive(Default)]
pub(in crate::app) struct InteractionController {
    selected: Option<usize>,
    emphasized_nodes: HashSet<usize>,
    emphasized_edges: HashSet<usize>,
    tooltip: Option<Tooltip>,
}

impl InteractionController {
    pub(in crate::app) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(in crate::app) fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub(in crate::app) fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Selects `node_id` and its closed neighborhood, or clears everything for `None`
    /// or an id outside the graph. Returns the world position to focus on.
    pub(in crate::app) fn select(
        &mut self,
        graph: &RenderGraph,
        node_id: Option<&str>,
    ) -> Option<Vec2> {
        self.selected = None;
        self.emphasized_nodes.clear();
        self.emphasized_edges.clear();

        let index = node_id.and_then(|id| graph.index_by_id.get(id).copied())?;
        self.selected = Some(index);
        self.emphasized_nodes.insert(index);
        for &edge_index in &graph.incident[index] {
            let edge = &graph.edges[edge_index];
            self.emphasized_edges.insert(edge_index);
            self.emphasized_nodes.insert(edge.source);
            self.emphasized_nodes.insert(edge.target);
        }

        Some(graph.nodes[index].world_pos)
    }

    pub(in crate::app) fn node_emphasis(&self, index: usize) -> Emphasis {
        match self.selected {
            None => Emphasis::Normal,
            Some(_) if self.emphasized_nodes.contains(&index) => Emphasis::Emphasized,
            Some(_) => Emphasis::Dimmed,
        }
    }

    pub(in crate::app) fn edge_emphasis(&self, edge_index: usize) -> Emphasis {
        match self.selected {
            None => Emphasis::Normal,
            Some(_) if self.emphasized_edges.contains(&edge_index) => Emphasis::Emphasized,
            Some(_) => Emphasis::Dimmed,
        }
    }

    /// Points the tooltip at the hovered node, following the pointer.
    pub(in crate::app) fn hover(&mut self, graph: &RenderGraph, index: usize, pointer: Pos2) {
        let Some(node) = graph.nodes.get(index) else {
            self.clear_hover();
            return;
        };

        let position = pointer + TOOLTIP_OFFSET;
        if let Some(tooltip) = self
            .tooltip
            .as_mut()
            .filter(|tooltip| tooltip.node_index == index)
        {
            tooltip.position = position;
            return;
        }

        let label = &node.visual.short_label;
        let text = if label.is_empty() {
            node.visual.node.url.clone()
        } else {
            label.clone()
        };
        self.tooltip = Some(Tooltip {
            node_index: index,
            text,
            position,
        });
    }

    pub(in crate::app) fn clear_hover(&mut self) {
        self.tooltip = None;
    }
}
