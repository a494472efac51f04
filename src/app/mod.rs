use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};
use flight_graph::{
    Canvas, FlightNetwork, GeoPoint, LayoutMode, Simulation, SimulationConfig, load_network,
};

mod graph;
mod render_utils;
mod ui;

pub struct FlightGraphApp {
    dataset: PathBuf,
    config: SimulationConfig,
    mode: LayoutMode,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<FlightNetwork, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    simulation: Simulation,
    geo_points: Vec<GeoPoint>,
    categories: Vec<String>,
    category_index: Vec<usize>,
    radii: Vec<f32>,
    canvas: Canvas,
    pan: Vec2,
    zoom: f32,
    dragging: Option<usize>,
    screen_positions: Vec<Pos2>,
    live_physics: bool,
}

impl FlightGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dataset: PathBuf,
        config: SimulationConfig,
        mode: LayoutMode,
    ) -> Self {
        let state = Self::start_load(dataset.clone());
        Self {
            dataset,
            config,
            mode,
            state,
        }
    }

    fn start_load(dataset: PathBuf) -> AppState {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_network(&dataset).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }
}

impl eframe::App for FlightGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(
                        match result.and_then(|network| {
                            ViewModel::new(&network, self.config.clone(), self.mode)
                        }) {
                            Ok(model) => AppState::Ready(Box::new(model)),
                            Err(error) => AppState::Error(error),
                        },
                    );
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading flight network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load flight network");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.dataset.clone()));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
