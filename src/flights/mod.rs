mod network;
mod parse;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

pub use network::{Airport, FlightNetwork, Route};
pub use parse::{AirportRecord, Dataset, RouteRecord, parse_dataset};

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read flight dataset {}", path.display()))?;
    parse_dataset(&raw)
        .with_context(|| format!("failed to parse flight dataset {}", path.display()))
}

pub fn load_network(path: &Path) -> Result<FlightNetwork> {
    let dataset = load_dataset(path)?;
    let network = FlightNetwork::from_dataset(dataset)
        .with_context(|| format!("invalid flight dataset {}", path.display()))?;

    info!(
        airports = network.airport_count(),
        routes = network.route_count(),
        excluded = network.excluded_airports,
        "loaded flight network"
    );
    Ok(network)
}
