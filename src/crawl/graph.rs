use serde::{Deserialize, Serialize};

/// Pages the crawl service visits per run at most.
pub const CRAWL_CAP_PAGES: u32 = 1000;
/// Outbound links the crawl service counts per crawled page at most.
pub const MAX_LINKS_PER_PAGE: u32 = 250;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub domain: String,
    pub depth: u32,
    #[serde(default)]
    pub pagerank: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphResponse {
    pub seed: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphResponse {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Highest-scored nodes first; equal scores keep their response order.
    pub fn top_by_pagerank(&self, limit: usize) -> Vec<GraphNode> {
        let mut ranked = self.nodes.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.pagerank.total_cmp(&a.pagerank));
        ranked.into_iter().take(limit).cloned().collect()
    }
}

/// Parameters of one crawl/rank request. Serializes to the service's request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunParameters {
    #[serde(rename = "url")]
    pub seed_url: String,
    pub max_hops: u32,
    pub max_pages: u32,
    pub same_domain_only: bool,
}

impl RunParameters {
    pub const DEFAULT_SEED_URL: &'static str = "https://example.com";
    pub const DEFAULT_HOPS: u32 = 2;
    pub const HOP_CHOICES: [u32; 3] = [1, 2, 3];

    pub fn new(seed_url: impl Into<String>, max_hops: u32, same_domain_only: bool) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_hops,
            max_pages: CRAWL_CAP_PAGES,
            same_domain_only,
        }
    }
}

impl Default for RunParameters {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED_URL, Self::DEFAULT_HOPS, false)
    }
}
