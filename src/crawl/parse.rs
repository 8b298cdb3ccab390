use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::graph::{GraphEdge, GraphNode, GraphResponse};

/// Decodes a ranking response body. Anything that is not a usable graph decodes to an
/// empty graph rather than an error; entries that fail to decode are skipped.
pub(super) fn parse_graph_response(raw: &str) -> GraphResponse {
    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, "ranking response was not valid JSON, treating as empty graph");
            return GraphResponse::default();
        }
    };

    let Some(object) = parsed.as_object() else {
        tracing::warn!("ranking response was not a JSON object, treating as empty graph");
        return GraphResponse::default();
    };

    let seed = object
        .get("seed")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    let mut known_ids = HashSet::new();
    let mut nodes = Vec::new();
    for value in object
        .get("nodes")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let Ok(node) = GraphNode::deserialize(value) else {
            continue;
        };
        if known_ids.insert(node.id.clone()) {
            nodes.push(node);
        }
    }

    let edges = object
        .get("edges")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|value| GraphEdge::deserialize(value).ok())
        .filter(|edge| known_ids.contains(&edge.source) && known_ids.contains(&edge.target))
        .collect::<Vec<_>>();

    GraphResponse { seed, nodes, edges }
}

/// Turns a failed response body into the text shown to the user: the `detail` field when
/// present, the raw body when it is plain text, the pretty-printed JSON otherwise.
pub(super) fn error_detail(status: u16, raw: &str) -> String {
    let fallback = || format!("request failed with status code {status}");

    if raw.trim().is_empty() {
        return fallback();
    }

    let Ok(parsed) = serde_json::from_str::<Value>(raw) else {
        return raw.to_owned();
    };

    let shown = match parsed.get("detail") {
        Some(Value::Null) | None => &parsed,
        Some(detail) => detail,
    };

    match shown {
        Value::String(text) => text.clone(),
        Value::Null => fallback(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
