use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Spinner, Stroke, Ui, vec2};

use super::super::camera::FIT_PADDING;
use super::super::interaction::Emphasis;
use super::super::layout::LayoutSignature;
use super::super::render_utils::{
    DIMMED_OPACITY, circle_visible, draw_arrow, draw_background, edge_visible,
};
use super::super::ViewModel;
use super::input::node_under_pointer;

const EDGE_COLOR: Color32 = Color32::from_rgb(100, 116, 139);
const EDGE_OPACITY: f32 = 0.55;
const NODE_FILL_OPACITY: f32 = 0.95;
const NODE_BORDER_WIDTH: f32 = 3.0;
const SEED_BORDER_WIDTH: f32 = 10.0;
const SELECTED_BORDER: Color32 = Color32::from_rgb(17, 24, 39);
const SELECTED_BORDER_WIDTH: f32 = 10.0;

fn emphasis_opacity(emphasis: Emphasis, normal: f32) -> f32 {
    match emphasis {
        Emphasis::Normal => normal,
        Emphasis::Emphasized => 1.0,
        Emphasis::Dimmed => DIMMED_OPACITY,
    }
}

impl ViewModel {
    /// Runs this frame's share of the force pass, then the one-shot radial push and fit.
    fn settle_layout(&mut self, rect: Rect) -> bool {
        let Some(graph) = self.graph_cache.as_mut() else {
            return false;
        };

        if !graph.is_stabilized() {
            graph.advance(&self.layout_config, Self::STEPS_PER_FRAME);
            return true;
        }

        let signature =
            LayoutSignature::new(&self.filtered, self.runs.applied().max_hops, self.top_k);
        self.layout.apply_radial_push(graph, &signature);

        if std::mem::take(&mut self.fit_pending)
            && let Some(bounds) = graph.bounds()
        {
            self.camera.fit(bounds, rect.size(), FIT_PADDING);
        }
        false
    }

    fn draw_empty_canvas(&self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            if self.runs.is_loading() {
                ui.heading("Crawling and ranking...");
                ui.add_space(8.0);
                ui.spinner();
            } else if self.runs.committed().is_some() {
                ui.heading("No nodes within the selected hop limit.");
            } else {
                ui.heading("No graph yet");
                ui.label("Enter a seed URL and press Run.");
            }
        });
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_cache.is_none() {
            self.draw_empty_canvas(ui);
            return;
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let layout_running = self.settle_layout(rect);
        self.camera.tick(now);
        if layout_running || self.camera.is_animating() || response.dragged() {
            ui.ctx().request_repaint();
        }

        draw_background(&painter, rect, &self.camera);

        let Some(graph) = self.graph_cache.as_ref() else {
            return;
        };

        let zoom = self.camera.zoom;
        let screen_positions = graph
            .nodes
            .iter()
            .map(|node| self.camera.world_to_screen(rect, node.world_pos))
            .collect::<Vec<Pos2>>();
        let screen_radii = graph
            .nodes
            .iter()
            .map(|node| (node.radius() * zoom).max(1.5))
            .collect::<Vec<f32>>();

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));
        let hovered =
            pointer.and_then(|pointer| node_under_pointer(pointer, &screen_positions, &screen_radii));
        match (hovered, pointer) {
            (Some(index), Some(pointer)) => {
                self.interaction.hover(graph, index, pointer);
                ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
            }
            _ => self.interaction.clear_hover(),
        }

        for (edge_index, edge) in graph.edges.iter().enumerate() {
            let start = screen_positions[edge.source];
            let end = screen_positions[edge.target];
            if !edge_visible(rect, start, end, 4.0) {
                continue;
            }

            let opacity = emphasis_opacity(self.interaction.edge_emphasis(edge_index), EDGE_OPACITY);
            draw_arrow(
                &painter,
                (start, screen_radii[edge.source]),
                (end, screen_radii[edge.target]),
                (edge.width * zoom.sqrt()).max(0.5),
                EDGE_COLOR.gamma_multiply(opacity),
            );
        }

        let selected = self.interaction.selected();
        for (index, node) in graph.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius + SEED_BORDER_WIDTH * zoom) {
                continue;
            }

            let opacity = emphasis_opacity(self.interaction.node_emphasis(index), 1.0);
            let (border_color, border_width) = if selected == Some(index) {
                (SELECTED_BORDER, SELECTED_BORDER_WIDTH)
            } else if node.visual.is_seed {
                (node.visual.border_color, SEED_BORDER_WIDTH)
            } else {
                (node.visual.border_color, NODE_BORDER_WIDTH)
            };

            painter.circle_filled(
                position,
                radius,
                node.visual.fill_color.gamma_multiply(NODE_FILL_OPACITY * opacity),
            );
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    (border_width * zoom).max(1.0),
                    border_color.gamma_multiply(opacity),
                ),
            );

            if node.visual.is_seed || selected == Some(index) || radius > 24.0 {
                painter.text(
                    position + vec2(0.0, radius + 6.0),
                    Align2::CENTER_TOP,
                    &node.visual.short_label,
                    FontId::proportional(12.0),
                    Color32::from_gray(30).gamma_multiply(opacity),
                );
            }
        }

        if let Some(tooltip) = self.interaction.tooltip() {
            let galley = painter.layout_no_wrap(
                tooltip.text.clone(),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
            let frame = Rect::from_min_size(tooltip.position, galley.size() + vec2(12.0, 8.0));
            painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(17, 24, 39, 230));
            painter.galley(frame.min + vec2(6.0, 4.0), galley, Color32::from_gray(240));
        }

        if self.graph_busy() {
            painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(248, 250, 252, 140));
            ui.put(
                Rect::from_center_size(rect.center(), vec2(36.0, 36.0)),
                Spinner::new().size(36.0),
            );
            painter.text(
                rect.center() + vec2(0.0, 30.0),
                Align2::CENTER_TOP,
                "Laying out graph...",
                FontId::proportional(14.0),
                Color32::from_gray(60),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let clicked = hovered
                .and_then(|index| graph.nodes.get(index))
                .map(|node| node.id().to_owned());
            self.select_node(clicked.as_deref(), now);
        }
    }
}
