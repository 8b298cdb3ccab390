use std::sync::Arc;

use eframe::egui::Context;

use crate::crawl::{GraphNode, GraphSource, RunParameters};

mod bootstrap;
mod camera;
mod encode;
mod filter;
mod graph;
mod interaction;
mod layout;
mod render_utils;
mod run;
mod ui;

pub use bootstrap::BootstrapParams;

use camera::Camera;
use encode::VisualNode;
use filter::{FilteredGraph, filter_graph};
use interaction::InteractionController;
use layout::{LayoutConfig, LayoutEngine, RenderGraph};
use run::{RunController, RunEvent};

pub struct PageRankApp {
    model: ViewModel,
    autorun: bool,
}

struct ViewModel {
    runs: RunController,
    /// Run parameters as currently edited, not yet applied.
    ui_params: RunParameters,
    top_k: usize,
    filtered: FilteredGraph,
    filter_dirty: bool,
    graph_version: u64,
    graph_cache: Option<RenderGraph>,
    layout: LayoutEngine,
    layout_config: LayoutConfig,
    fit_pending: bool,
    interaction: InteractionController,
    camera: Camera,
    top_ranked: Vec<GraphNode>,
    ranking_search: String,
}

impl PageRankApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: Arc<dyn GraphSource>,
        bootstrap: BootstrapParams,
    ) -> Self {
        tracing::info!(
            seed = bootstrap.seed_url.as_deref().unwrap_or(RunParameters::DEFAULT_SEED_URL),
            hop = bootstrap.hop,
            top_k = bootstrap.top_k,
            autorun = bootstrap.autorun(),
            "bootstrap parameters resolved"
        );

        Self {
            autorun: bootstrap.autorun(),
            model: ViewModel::new(RunController::new(source), &bootstrap),
        }
    }
}

impl eframe::App for PageRankApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if std::mem::take(&mut self.autorun) {
            self.model.start_run();
        }

        self.model.show(ctx);
    }
}

impl ViewModel {
    pub(in crate::app) const TOP_RANKED_ROWS: usize = 20;
    const STEPS_PER_FRAME: usize = 12;

    fn new(runs: RunController, bootstrap: &BootstrapParams) -> Self {
        Self {
            runs,
            ui_params: bootstrap.initial_run_parameters(),
            top_k: bootstrap.top_k,
            filtered: FilteredGraph::default(),
            filter_dirty: false,
            graph_version: 0,
            graph_cache: None,
            layout: LayoutEngine::default(),
            layout_config: LayoutConfig::default(),
            fit_pending: false,
            interaction: InteractionController::default(),
            camera: Camera::default(),
            top_ranked: Vec::new(),
            ranking_search: String::new(),
        }
    }

    pub(in crate::app) fn start_run(&mut self) {
        if self.runs.is_loading() {
            return;
        }

        self.ui_params.seed_url = self.ui_params.seed_url.trim().to_owned();
        self.runs.run(self.ui_params.clone());
        self.top_ranked.clear();
        self.filter_dirty = true;
    }

    /// Applies finished runs and re-filters when anything upstream of the view changed.
    fn sync_view(&mut self) {
        if let Some(event) = self.runs.poll() {
            if event == RunEvent::Committed {
                self.layout.invalidate();
                self.top_ranked = self
                    .runs
                    .committed()
                    .map(|graph| graph.top_by_pagerank(Self::TOP_RANKED_ROWS))
                    .unwrap_or_default();
            }
            self.filter_dirty = true;
        }

        if self.filter_dirty {
            self.rebuild_view();
        }
    }

    fn rebuild_view(&mut self) {
        self.filter_dirty = false;
        self.filtered = self
            .runs
            .committed()
            .map(|graph| filter_graph(graph, self.runs.applied().max_hops, self.top_k))
            .unwrap_or_default();

        self.graph_version += 1;
        self.graph_cache = (!self.filtered.nodes.is_empty())
            .then(|| RenderGraph::build(&self.filtered, self.graph_version));
        self.interaction.reset();
        self.fit_pending = self.graph_cache.is_some();

        tracing::debug!(
            version = self.graph_version,
            nodes = self.filtered.nodes.len(),
            edges = self.filtered.edges.len(),
            "rebuilt filtered view"
        );
    }

    /// Selects `node_id` in the current view and glides the camera to it.
    pub(in crate::app) fn select_node(&mut self, node_id: Option<&str>, now: f64) {
        let Some(graph) = self.graph_cache.as_ref() else {
            self.interaction.reset();
            return;
        };

        if let Some(focus) = self.interaction.select(graph, node_id) {
            self.camera.focus_on(focus, now);
        }
    }

    pub(in crate::app) fn selected_node(&self) -> Option<&VisualNode> {
        let index = self.interaction.selected()?;
        self.graph_cache
            .as_ref()
            .and_then(|graph| graph.nodes.get(index))
            .map(|node| &node.visual)
    }

    /// Busy until the layout has settled and the radial push had its chance.
    pub(in crate::app) fn graph_busy(&self) -> bool {
        self.runs.is_loading()
            || self
                .graph_cache
                .as_ref()
                .is_some_and(|graph| !graph.is_stabilized() || self.fit_pending)
    }
}
