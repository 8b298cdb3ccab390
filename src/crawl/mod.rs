mod client;
mod graph;
mod parse;

pub use client::{GraphSource, HttpGraphSource, RequestError};
pub use graph::{
    CRAWL_CAP_PAGES, GraphEdge, GraphNode, GraphResponse, MAX_LINKS_PER_PAGE, RunParameters,
};
