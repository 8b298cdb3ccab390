use std::collections::HashSet;

use crate::crawl::{GraphEdge, GraphNode, GraphResponse};

/// The bounded slice of a response that is actually drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct FilteredGraph {
    pub(in crate::app) seed_url: String,
    pub(in crate::app) seed_node: Option<GraphNode>,
    pub(in crate::app) nodes: Vec<GraphNode>,
    pub(in crate::app) edges: Vec<GraphEdge>,
}

/// Seed preference: the node whose url is the response seed, else the hop-0 node.
fn find_seed_node<'a>(hop_nodes: &[&'a GraphNode], seed: &str) -> Option<&'a GraphNode> {
    hop_nodes
        .iter()
        .find(|node| node.url == seed)
        .or_else(|| hop_nodes.iter().find(|node| node.depth == 0))
        .copied()
}

pub(in crate::app) fn filter_graph(
    response: &GraphResponse,
    applied_hop: u32,
    top_k: usize,
) -> FilteredGraph {
    let hop_nodes = response
        .nodes
        .iter()
        .filter(|node| node.depth <= applied_hop)
        .collect::<Vec<_>>();

    // Stable sort: equal scores keep response order.
    let mut kept = hop_nodes.clone();
    kept.sort_by(|a, b| b.pagerank.total_cmp(&a.pagerank));
    kept.truncate(top_k);

    let seed_node = find_seed_node(&hop_nodes, &response.seed);
    if let Some(seed) = seed_node
        && !kept.iter().any(|node| node.id == seed.id)
    {
        kept.insert(0, seed);
    }

    let mut retained_ids = HashSet::with_capacity(kept.len());
    let mut nodes = Vec::with_capacity(kept.len());
    for node in kept {
        if retained_ids.insert(node.id.as_str()) {
            nodes.push(node.clone());
        }
    }

    let edges = response
        .edges
        .iter()
        .filter(|edge| {
            retained_ids.contains(edge.source.as_str())
                && retained_ids.contains(edge.target.as_str())
        })
        .cloned()
        .collect::<Vec<_>>();

    FilteredGraph {
        seed_url: response.seed.clone(),
        seed_node: seed_node.cloned(),
        nodes,
        edges,
    }
}
