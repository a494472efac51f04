use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2, vec2};
use flight_graph::{Canvas, GeoScales};

use super::super::ViewModel;
use super::super::render_utils::{
    category_color, circle_visible, draw_background, world_to_screen,
};
use crate::GEO_MARGIN;

impl ViewModel {
    pub(in crate::app) fn screen_radius(&self, index: usize) -> f32 {
        let base = self.radii.get(index).copied().unwrap_or(3.0);
        (base * self.zoom.powf(0.4)).clamp(2.0, 40.0)
    }

    /// Re-fits the geographic scales when the drawing area changes size.
    fn fit_canvas(&mut self, size: Vec2) {
        let canvas = Canvas::new(size.x.max(1.0), size.y.max(1.0));
        if (canvas.width - self.canvas.width).abs() < 1.0
            && (canvas.height - self.canvas.height).abs() < 1.0
        {
            return;
        }

        let scales = GeoScales::fit(&self.geo_points, canvas, GEO_MARGIN);
        self.simulation.resize(canvas, &scales);
        self.simulation
            .restart(self.simulation.config().interaction.drag_alpha_target);
        self.canvas = canvas;
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.fit_canvas(rect.size());
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        if self.live_physics {
            self.simulation.tick();
        }

        let origin = self.canvas.center();
        self.screen_positions.clear();
        let (pan, zoom) = (self.pan, self.zoom);
        self.screen_positions.extend(
            self.simulation
                .particles()
                .iter()
                .map(|particle| world_to_screen(rect, origin, pan, zoom, particle.position)),
        );

        let hovered = self.hovered_index(ui.input(|input| input.pointer.hover_pos()));
        self.handle_airport_drag(ui, rect, &response, hovered);
        if hovered.is_some() || self.dragging.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.dragging.is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::Grab
                };
            });
        }

        let zoom_sqrt = self.zoom.sqrt();
        let link_stroke = Stroke::new(
            (0.8 * zoom_sqrt).clamp(0.4, 2.4),
            Color32::from_rgba_unmultiplied(150, 160, 175, 70),
        );
        let focus = self.dragging.or(hovered);
        for link in self.simulation.links() {
            let (Some(&start), Some(&end)) = (
                self.screen_positions.get(link.source),
                self.screen_positions.get(link.target),
            ) else {
                continue;
            };
            let touches_focus =
                focus.is_some_and(|index| index == link.source || index == link.target);
            let stroke = if touches_focus {
                Stroke::new(
                    (1.6 * zoom_sqrt).clamp(1.0, 3.6),
                    Color32::from_rgb(246, 206, 104),
                )
            } else {
                link_stroke
            };
            painter.line_segment([start, end], stroke);
        }

        for (index, position) in self.screen_positions.iter().copied().enumerate() {
            let radius = self.screen_radius(index);
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let color = category_color(self.category_index.get(index).copied().unwrap_or(0));
            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            if (focus == Some(index) || radius > 12.0 || self.zoom > 2.0)
                && let Some(airport) = self.simulation.airport(index)
            {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    airport.id.as_str(),
                    FontId::proportional(11.0),
                    Color32::from_gray(235),
                );
            }
        }

        if let Some(airport) = focus.and_then(|index| self.simulation.airport(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{} ({})  |  {}  |  flow {:.0}",
                    airport.label, airport.id, airport.category, airport.flow
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        ui.ctx().request_repaint();
    }
}
