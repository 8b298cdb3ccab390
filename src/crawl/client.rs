use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use url::Url;

use super::graph::{GraphResponse, RunParameters};
use super::parse::{error_detail, parse_graph_response};

const PAGERANK_ENDPOINT: &str = "graph/pagerank";

/// Failure of a ranking request. `Display` is the text shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("{detail}")]
    Server { status: u16, detail: String },
    #[error("{0}")]
    Transport(String),
    #[error("background request worker disconnected")]
    Worker,
}

impl RequestError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Anything that can answer a crawl/rank request. Called from worker threads.
pub trait GraphSource: Send + Sync {
    fn fetch(&self, params: &RunParameters) -> Result<GraphResponse, RequestError>;
}

pub struct HttpGraphSource {
    client: Client,
    endpoint: Url,
}

impl HttpGraphSource {
    pub fn new(api_base: &str) -> Result<Self> {
        let endpoint = pagerank_endpoint(api_base)?;

        // The service decides how long a crawl may take; no client-side deadline.
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl GraphSource for HttpGraphSource {
    fn fetch(&self, params: &RunParameters) -> Result<GraphResponse, RequestError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(params)
            .send()
            .map_err(|error| RequestError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| RequestError::Transport(error.to_string()))?;

        if status.is_success() {
            Ok(parse_graph_response(&body))
        } else {
            Err(RequestError::Server {
                status: status.as_u16(),
                detail: error_detail(status.as_u16(), &body),
            })
        }
    }
}

fn pagerank_endpoint(api_base: &str) -> Result<Url> {
    let mut base = Url::parse(api_base.trim())
        .with_context(|| format!("invalid service base URL: {api_base}"))?;

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(PAGERANK_ENDPOINT)
        .with_context(|| format!("failed to build ranking endpoint from {api_base}"))
}
