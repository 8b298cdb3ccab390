use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::crawl::GraphNode;

use super::super::ViewModel;
use super::super::encode::normalize_domain;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Indices of ranking rows whose url or domain matches `query`, in ranking order.
fn matching_rows(rows: &[GraphNode], query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return (0..rows.len()).collect();
    }

    let matcher = SkimMatcherV2::default();
    rows.iter()
        .enumerate()
        .filter(|(_, node)| {
            fuzzy_match_score(&matcher, &node.url, query).is_some()
                || fuzzy_match_score(&matcher, &normalize_domain(&node.domain, &node.url), query)
                    .is_some()
        })
        .map(|(index, _)| index)
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);
        self.draw_selection(ui);

        ui.separator();
        ui.heading(format!("Top {} by PageRank", Self::TOP_RANKED_ROWS));
        ui.add_space(4.0);
        self.draw_ranking(ui);
    }

    fn draw_selection(&self, ui: &mut Ui) {
        let Some(visual) = self.selected_node() else {
            ui.label("Select a node in the graph or the ranking below.");
            return;
        };
        let node = &visual.node;

        ui.label(RichText::new(node.url.as_str()).strong());
        ui.add_space(4.0);
        let domain = if visual.normalized_domain.is_empty() {
            "unknown"
        } else {
            visual.normalized_domain.as_str()
        };
        if visual.is_seed {
            ui.label(format!("Domain: {domain} (seed)"));
        } else if visual.is_same_domain_as_seed {
            ui.label(format!("Domain: {domain} (same as seed)"));
        } else {
            ui.label(format!("Domain: {domain}"));
        }
        ui.label(format!("Depth: {}", node.depth));
        ui.label(format!("PageRank: {:.6}", node.pagerank));
        ui.hyperlink_to("Open URL", node.url.as_str());
    }

    fn empty_ranking_message(&self) -> Option<&'static str> {
        if !self.top_ranked.is_empty() {
            None
        } else if self.runs.is_loading() {
            Some("Waiting for results...")
        } else if self.runs.committed().is_none() {
            Some("Run a crawl to see the ranking.")
        } else {
            Some("The last run found no pages to rank.")
        }
    }

    fn draw_ranking(&mut self, ui: &mut Ui) {
        if let Some(message) = self.empty_ranking_message() {
            ui.label(message);
            return;
        }

        ui.add(
            egui::TextEdit::singleline(&mut self.ranking_search)
                .hint_text("Filter by URL or domain")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(4.0);

        let rows = matching_rows(&self.top_ranked, &self.ranking_search);
        if rows.is_empty() {
            ui.label("No ranked page matches the filter.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("ranking_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for index in rows {
                    let node = &self.top_ranked[index];
                    let label = format!(
                        "{}. {}\n{:.6}  |  depth {}  |  {}",
                        index + 1,
                        node.url,
                        node.pagerank,
                        node.depth,
                        normalize_domain(&node.domain, &node.url)
                    );
                    if ui.link(label).on_hover_text(node.url.as_str()).clicked() {
                        clicked = Some(node.id.clone());
                    }
                }
            });

        if let Some(node_id) = clicked {
            let now = ui.input(|input| input.time);
            self.select_node(Some(&node_id), now);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::app::BootstrapParams;
    use crate::app::run::RunController;
    use crate::crawl::{GraphResponse, GraphSource, RequestError, RunParameters};

    struct NoPages;

    impl GraphSource for NoPages {
        fn fetch(&self, params: &RunParameters) -> Result<GraphResponse, RequestError> {
            Ok(GraphResponse {
                seed: params.seed_url.clone(),
                ..GraphResponse::default()
            })
        }
    }

    fn ranked(url: &str, domain: &str) -> GraphNode {
        GraphNode {
            id: url.to_owned(),
            url: url.to_owned(),
            domain: domain.to_owned(),
            depth: 1,
            pagerank: 0.1,
        }
    }

    fn rows() -> Vec<GraphNode> {
        vec![
            ranked("https://docs.rs/serde", "docs.rs"),
            ranked("https://www.rust-lang.org/learn", ""),
            ranked("https://crates.io/crates/egui", "crates.io"),
        ]
    }

    #[test]
    fn blank_query_keeps_every_row() {
        assert_eq!(matching_rows(&rows(), "  "), vec![0, 1, 2]);
    }

    #[test]
    fn query_matches_url_or_domain_fuzzily() {
        assert_eq!(matching_rows(&rows(), "egui"), vec![2]);
        assert_eq!(matching_rows(&rows(), "RUSTLANG"), vec![1]);
        assert_eq!(matching_rows(&rows(), "dcsrs"), vec![0]);
        assert!(matching_rows(&rows(), "zzzz").is_empty());
    }

    #[test]
    fn empty_ranking_tells_apart_no_run_loading_and_no_pages() {
        let mut model =
            ViewModel::new(RunController::new(Arc::new(NoPages)), &BootstrapParams::default());
        assert_eq!(model.empty_ranking_message(), Some("Run a crawl to see the ranking."));

        model.start_run();
        assert_eq!(model.empty_ranking_message(), Some("Waiting for results..."));

        let deadline = Instant::now() + Duration::from_secs(5);
        while model.runs.is_loading() {
            model.sync_view();
            assert!(Instant::now() < deadline, "run did not finish in time");
            thread::sleep(Duration::from_millis(2));
        }

        assert!(model.runs.committed().is_some());
        assert_eq!(
            model.empty_ranking_message(),
            Some("The last run found no pages to rank.")
        );

        model.top_ranked = rows();
        assert_eq!(model.empty_ranking_message(), None);
    }
}
