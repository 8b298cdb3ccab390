use eframe::egui::{self, Color32, RichText, Ui};

use crate::crawl::{CRAWL_CAP_PAGES, MAX_LINKS_PER_PAGE, RunParameters};

use super::super::ViewModel;
use super::super::bootstrap::TOP_K_CHOICES;
use super::super::run::RunStatus;

const PENDING_COLOR: Color32 = Color32::from_rgb(180, 83, 9);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 38, 38);

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Crawl Parameters");
        ui.separator();
        ui.add_space(4.0);

        let loading = self.runs.is_loading();

        ui.label("Seed URL");
        let seed_response = ui.add(
            egui::TextEdit::singleline(&mut self.ui_params.seed_url)
                .hint_text(RunParameters::DEFAULT_SEED_URL)
                .desired_width(f32::INFINITY),
        );
        let submitted =
            seed_response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));

        ui.add_space(6.0);
        egui::ComboBox::from_label("Max hops")
            .selected_text(self.ui_params.max_hops.to_string())
            .show_ui(ui, |ui| {
                for hop in RunParameters::HOP_CHOICES {
                    ui.selectable_value(&mut self.ui_params.max_hops, hop, hop.to_string());
                }
            })
            .response
            .on_hover_text("How many link-follow steps the crawl may take from the seed.");

        ui.checkbox(&mut self.ui_params.same_domain_only, "Same domain only")
            .on_hover_text("Only follow links that stay on the seed's domain.");

        ui.add_space(6.0);
        let previous_top_k = self.top_k;
        egui::ComboBox::from_label("Top-K nodes")
            .selected_text(self.top_k.to_string())
            .show_ui(ui, |ui| {
                for top_k in TOP_K_CHOICES {
                    ui.selectable_value(&mut self.top_k, top_k, top_k.to_string());
                }
            })
            .response
            .on_hover_text("Highest-ranked nodes to draw. Changing this never re-crawls.");
        if self.top_k != previous_top_k {
            tracing::debug!(top_k = self.top_k, "top-k changed, re-filtering");
            self.filter_dirty = true;
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let run_button = ui.add_enabled(!loading, egui::Button::new("Run"));
            if run_button.clicked() || (submitted && !loading) {
                self.start_run();
            }
            if loading {
                ui.spinner();
            }
            ui.label(match self.runs.status() {
                RunStatus::Idle => "Not run yet",
                RunStatus::Loading => "Running...",
                RunStatus::Committed => "Up to date",
                RunStatus::Failed(_) => "Last run failed",
            });
        });

        if !loading && self.runs.has_pending_changes(&self.ui_params) {
            ui.add_space(4.0);
            ui.colored_label(PENDING_COLOR, "Parameters changed. Press Run to apply.");
        }

        if let Some(error) = self.runs.error() {
            ui.add_space(4.0);
            ui.colored_label(ERROR_COLOR, RichText::new(error).strong());
        }

        ui.separator();
        let applied = self.runs.applied();
        ui.small(format!(
            "Applied: {} | hops {} | same domain {}",
            applied.seed_url,
            applied.max_hops,
            if applied.same_domain_only { "yes" } else { "no" }
        ));
        ui.small(format!(
            "The service crawls at most {CRAWL_CAP_PAGES} pages and counts up to \
             {MAX_LINKS_PER_PAGE} links per page."
        ));
    }
}
