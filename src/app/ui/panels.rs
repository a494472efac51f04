use eframe::egui::{self, Align, Context, Layout, Vec2};
use flight_graph::{Canvas, FlightNetwork, GeoScales, LayoutMode, Simulation, SimulationConfig};

use super::super::ViewModel;
use super::super::render_utils::flow_radius;
use crate::GEO_MARGIN;

impl ViewModel {
    pub(in crate::app) fn new(
        network: &FlightNetwork,
        config: SimulationConfig,
        mode: LayoutMode,
    ) -> Result<Self, String> {
        let canvas = Canvas::new(960.0, 600.0);
        let geo_points = network.geo_points().collect::<Vec<_>>();
        let scales = GeoScales::fit(&geo_points, canvas, GEO_MARGIN);
        let mut simulation =
            Simulation::new(network, canvas, &scales, config).map_err(|error| error.to_string())?;
        if mode != simulation.mode() {
            simulation.set_mode(mode);
        }

        let mut categories: Vec<String> = Vec::new();
        let category_index = network
            .airports
            .iter()
            .map(|airport| {
                match categories
                    .iter()
                    .position(|category| *category == airport.category)
                {
                    Some(index) => index,
                    None => {
                        categories.push(airport.category.clone());
                        categories.len() - 1
                    }
                }
            })
            .collect();

        let (min_flow, max_flow) = network.flow_range().unwrap_or((1.0, 1.0));
        let radii = network
            .airports
            .iter()
            .map(|airport| flow_radius(airport.flow, min_flow, max_flow))
            .collect();

        Ok(Self {
            simulation,
            geo_points,
            categories,
            category_index,
            radii,
            canvas,
            pan: Vec2::ZERO,
            zoom: 1.0,
            dragging: None,
            screen_positions: Vec::new(),
            live_physics: true,
        })
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("flight-graph");
                    ui.separator();
                    ui.label(format!("airports: {}", self.simulation.len()));
                    ui.label(format!("routes: {}", self.simulation.links().len()));

                    let next = self.simulation.mode().toggled();
                    if ui.button(format!("Switch to {} layout", next.label())).clicked() {
                        self.simulation.set_mode(next);
                    }
                    ui.checkbox(&mut self.live_physics, "Live physics");
                    if ui.button("Reset view").clicked() {
                        self.pan = Vec2::ZERO;
                        self.zoom = 1.0;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{} | alpha {:.3} | {:?}",
                            self.simulation.mode().label(),
                            self.simulation.alpha(),
                            self.simulation.state(),
                        ));
                    });
                });
            });

        egui::SidePanel::right("legend")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| self.draw_legend(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
