//! Force-directed layout of airport flight networks.
//!
//! Airports become particles, routes become springs, and a Barnes–Hut
//! many-body force keeps unrelated airports apart. In map mode every airport
//! is pulled toward its projected geographic position instead.

pub mod config;
pub mod error;
pub mod flights;
pub mod geo;
pub mod sim;

pub use config::{SimulationConfig, load_config};
pub use error::{SimulationError, SimulationResult};
pub use flights::{Airport, FlightNetwork, Route, load_dataset, load_network};
pub use geo::{GeoPoint, GeoScales, Projection};
pub use sim::{Canvas, LayoutMode, Simulation, SimulationState, Snapshot};
