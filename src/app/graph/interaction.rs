use eframe::egui::{self, Pos2, Rect, Ui};
use tracing::warn;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let origin = self.canvas.center();
        let world_before = screen_to_world(rect, origin, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 8.0);
        self.pan = pointer - rect.center() - ((world_before - origin) * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Nearest airport whose circle contains the pointer.
    pub(in crate::app) fn hovered_index(&self, pointer: Option<Pos2>) -> Option<usize> {
        let pointer = pointer?;
        self.screen_positions
            .iter()
            .enumerate()
            .filter_map(|(index, position)| {
                let radius = self.screen_radius(index) + 2.0;
                let distance = position.distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Forwards primary-button drags to the simulation's drag handlers.
    pub(in crate::app) fn handle_airport_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        let primary = egui::PointerButton::Primary;

        if response.drag_started_by(primary)
            && let Some(index) = hovered
        {
            match self.simulation.drag_start(index) {
                Ok(()) => self.dragging = Some(index),
                Err(error) => warn!(%error, "drag start rejected"),
            }
        }

        let Some(index) = self.dragging else {
            return;
        };

        if response.dragged_by(primary)
            && let Some(pointer) = ui.input(|input| input.pointer.interact_pos())
        {
            let world = screen_to_world(rect, self.canvas.center(), self.pan, self.zoom, pointer);
            if let Err(error) = self.simulation.drag_move(index, world) {
                warn!(%error, "drag move rejected");
            }
        }

        if response.drag_stopped() || !ui.input(|input| input.pointer.primary_down()) {
            if let Err(error) = self.simulation.drag_end(index) {
                warn!(%error, "drag end rejected");
            }
            self.dragging = None;
        }
    }
}
