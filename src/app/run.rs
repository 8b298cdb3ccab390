use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::crawl::{GraphResponse, GraphSource, RequestError, RunParameters};

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum RunStatus {
    Idle,
    Loading,
    Committed,
    Failed(String),
}

/// What a poll changed in the visible state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum RunEvent {
    Committed,
    Failed,
}

struct RunCompletion {
    generation: u64,
    params: RunParameters,
    result: Result<GraphResponse, RequestError>,
}

struct InFlightRun {
    generation: u64,
    params: RunParameters,
    rx: Receiver<Result<GraphResponse, RequestError>>,
}

/// Owns the request lifecycle. Worker threads only send results back; every state
/// change happens on the thread that calls [`RunController::poll`].
pub(in crate::app) struct RunController {
    source: Arc<dyn GraphSource>,
    generation: u64,
    in_flight: Vec<InFlightRun>,
    applied: RunParameters,
    status: RunStatus,
    committed: Option<GraphResponse>,
}

fn normalized_seed(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

impl RunController {
    pub(in crate::app) fn new(source: Arc<dyn GraphSource>) -> Self {
        Self {
            source,
            generation: 0,
            in_flight: Vec::new(),
            applied: RunParameters::default(),
            status: RunStatus::Idle,
            committed: None,
        }
    }

    pub(in crate::app) fn status(&self) -> &RunStatus {
        &self.status
    }

    pub(in crate::app) fn is_loading(&self) -> bool {
        self.status == RunStatus::Loading
    }

    pub(in crate::app) fn error(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub(in crate::app) fn applied(&self) -> &RunParameters {
        &self.applied
    }

    pub(in crate::app) fn committed(&self) -> Option<&GraphResponse> {
        self.committed.as_ref()
    }

    /// True when re-running would fetch a different graph. The view's top-K is not a
    /// run parameter and never counts.
    pub(in crate::app) fn has_pending_changes(&self, ui: &RunParameters) -> bool {
        normalized_seed(&ui.seed_url) != normalized_seed(&self.applied.seed_url)
            || ui.max_hops != self.applied.max_hops
            || ui.same_domain_only != self.applied.same_domain_only
    }

    /// Starts a run on a worker thread. Any earlier run still in flight is void from now on.
    pub(in crate::app) fn run(&mut self, params: RunParameters) -> u64 {
        let generation = self.begin(params.clone());

        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let worker_params = params.clone();
        thread::spawn(move || {
            let result = source.fetch(&worker_params);
            let _ = tx.send(result);
        });

        self.in_flight.push(InFlightRun {
            generation,
            params,
            rx,
        });
        generation
    }

    fn begin(&mut self, params: RunParameters) -> u64 {
        self.generation += 1;
        self.status = RunStatus::Loading;
        self.committed = None;

        tracing::info!(
            generation = self.generation,
            seed = %params.seed_url,
            max_hops = params.max_hops,
            same_domain_only = params.same_domain_only,
            "starting ranking run"
        );
        self.generation
    }

    /// Applies a finished run if, and only if, it is the latest one started.
    fn complete(&mut self, completion: RunCompletion) -> Option<RunEvent> {
        if completion.generation != self.generation {
            tracing::debug!(
                generation = completion.generation,
                current = self.generation,
                "dropping stale ranking result"
            );
            return None;
        }

        match completion.result {
            Ok(graph) => {
                tracing::info!(
                    generation = completion.generation,
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    "ranking run committed"
                );
                self.applied = completion.params;
                self.committed = Some(graph);
                self.status = RunStatus::Committed;
                Some(RunEvent::Committed)
            }
            Err(error) => {
                tracing::warn!(
                    generation = completion.generation,
                    status = ?error.status(),
                    %error,
                    "ranking run failed"
                );
                self.status = RunStatus::Failed(error.to_string());
                Some(RunEvent::Failed)
            }
        }
    }

    /// Drains finished workers. Stale runs are discarded once they resolve.
    pub(in crate::app) fn poll(&mut self) -> Option<RunEvent> {
        let mut event = None;
        let mut pending = Vec::with_capacity(self.in_flight.len());

        for run in std::mem::take(&mut self.in_flight) {
            let result = match run.rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => {
                    pending.push(run);
                    continue;
                }
                Err(TryRecvError::Disconnected) => Err(RequestError::Worker),
            };

            let completion = RunCompletion {
                generation: run.generation,
                params: run.params,
                result,
            };
            if let Some(applied) = self.complete(completion) {
                event = Some(applied);
            }
        }

        self.in_flight = pending;
        event
    }

    pub(in crate::app) fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }
}
