use eframe::egui::{self, Context, RichText, Ui};

use crate::crawl::CRAWL_CAP_PAGES;
use crate::util::format_count;

use super::super::ViewModel;

fn stat_tile(ui: &mut Ui, caption: &str, value: String, busy: bool) {
    ui.group(|ui| {
        ui.set_min_width(130.0);
        ui.vertical(|ui| {
            ui.small(caption);
            ui.horizontal(|ui| {
                ui.label(RichText::new(value).strong().size(18.0));
                if busy {
                    ui.spinner();
                }
            });
        });
    });
}

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.sync_view();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.heading("PageRank graph");
                    ui.separator();
                    self.draw_stat_tiles(ui);
                });
                ui.add_space(4.0);
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        if self.runs.has_in_flight() {
            ctx.request_repaint();
        }
    }

    /// Caption, value and busy marker per tile. Every tile is busy while a run loads
    /// or the layout settles.
    fn stat_tiles(&self) -> [(&'static str, String, bool); 4] {
        let busy = self.graph_busy();
        let discovered = self.runs.committed().map_or(0, |graph| graph.node_count());

        [
            ("Crawl cap (pages)", format_count(CRAWL_CAP_PAGES as usize), busy),
            ("Discovered nodes", format_count(discovered), busy),
            ("Visible nodes", format_count(self.filtered.nodes.len()), busy),
            ("Visible edges", format_count(self.filtered.edges.len()), busy),
        ]
    }

    fn draw_stat_tiles(&self, ui: &mut Ui) {
        for (caption, value, busy) in self.stat_tiles() {
            stat_tile(ui, caption, value, busy);
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
    use crate::crawl::{GraphNode, GraphResponse, GraphSource, RequestError, RunParameters};

    struct TwoPages;

    impl GraphSource for TwoPages {
        fn fetch(&self, params: &RunParameters) -> Result<GraphResponse, RequestError> {
            let page = |id: &str, depth| GraphNode {
                id: id.to_owned(),
                url: format!("{}/{id}", params.seed_url),
                domain: String::new(),
                depth,
                pagerank: 0.5,
            };
            Ok(GraphResponse {
                seed: params.seed_url.clone(),
                nodes: vec![page("root", 0), page("child", 1)],
                edges: Vec::new(),
            })
        }
    }

    fn busy_markers(model: &ViewModel) -> Vec<bool> {
        model.stat_tiles().iter().map(|(_, _, busy)| *busy).collect()
    }

    #[test]
    fn every_tile_is_busy_while_loading_or_settling() {
        let mut model = ViewModel::new(
            RunController::new(Arc::new(TwoPages)),
            &BootstrapParams::default(),
        );
        assert_eq!(busy_markers(&model), [false; 4]);

        model.start_run();
        assert_eq!(busy_markers(&model), [true; 4]);

        let deadline = Instant::now() + Duration::from_secs(5);
        while model.runs.is_loading() {
            model.sync_view();
            assert!(Instant::now() < deadline, "run did not finish in time");
            thread::sleep(Duration::from_millis(2));
        }

        let tiles = model.stat_tiles();
        assert_eq!(tiles[1].1, "2");
        assert_eq!(busy_markers(&model), [true; 4], "layout has not settled yet");
    }
}
