use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::parse::{Dataset, normalize_id};
use crate::error::{SimulationError, SimulationResult};
use crate::geo::GeoPoint;

/// An airport that carries flow and therefore takes part in the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Airport {
    pub id: String,
    pub label: String,
    pub category: String,
    pub geo: GeoPoint,
    /// Aggregate flow volume, used for radius.
    pub flow: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub source: String,
    pub destination: String,
    pub flights: f64,
}

#[derive(Clone, Debug, Default)]
pub struct FlightNetwork {
    pub airports: Vec<Airport>,
    pub routes: Vec<Route>,
    pub excluded_airports: usize,
    pub dropped_routes: usize,
}

fn finite_non_negative(
    value: f64,
    field: &'static str,
    subject: impl FnOnce() -> String,
) -> SimulationResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::InvalidWeight {
            field,
            subject: subject(),
            value,
        })
    }
}

fn coordinate(
    value: f64,
    limit: f64,
    field: &'static str,
    id: &str,
) -> SimulationResult<f64> {
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(SimulationError::InvalidWeight {
            field,
            subject: format!("airport {id}"),
            value,
        })
    }
}

impl FlightNetwork {
    /// Validates raw records and derives the simulated airport set.
    ///
    /// Routes are kept even when an endpoint is unknown; binding them to
    /// particles is where a dangling endpoint becomes fatal.
    pub fn from_dataset(dataset: Dataset) -> SimulationResult<Self> {
        let mut routes = Vec::with_capacity(dataset.routes.len());
        let mut dropped_routes = 0usize;
        for record in dataset.routes {
            let source = normalize_id(&record.source);
            let destination = normalize_id(&record.destination);
            let flights = finite_non_negative(record.weight, "flight count", || {
                format!("route {source} -> {destination}")
            })?;

            if flights == 0.0 {
                debug!(%source, %destination, "dropping route without flights");
                dropped_routes += 1;
                continue;
            }

            routes.push(Route {
                source,
                destination,
                flights,
            });
        }

        let mut route_flow: HashMap<&str, f64> = HashMap::new();
        for route in &routes {
            *route_flow.entry(route.source.as_str()).or_default() += route.flights;
            *route_flow.entry(route.destination.as_str()).or_default() += route.flights;
        }

        let mut seen = HashSet::with_capacity(dataset.airports.len());
        let mut airports = Vec::with_capacity(dataset.airports.len());
        let mut excluded_airports = 0usize;
        for record in dataset.airports {
            let id = normalize_id(&record.id);
            if !seen.insert(id.clone()) {
                return Err(SimulationError::DuplicateAirport(id));
            }

            let lat = coordinate(record.geo_lat, 90.0, "latitude", &id)?;
            let lon = coordinate(record.geo_lon, 180.0, "longitude", &id)?;
            let stated = record
                .weight
                .map(|weight| finite_non_negative(weight, "weight", || format!("airport {id}")))
                .transpose()?;
            // A zero stated weight falls back to route flow like a missing one.
            let flow = match stated {
                Some(weight) if weight > 0.0 => weight,
                _ => route_flow.get(id.as_str()).copied().unwrap_or(0.0),
            };

            if flow == 0.0 {
                debug!(airport = %id, "excluding airport without flow");
                excluded_airports += 1;
                continue;
            }

            airports.push(Airport {
                label: record.label.unwrap_or_else(|| id.clone()),
                category: record.category.unwrap_or_else(|| "other".to_owned()),
                geo: GeoPoint::new(lat, lon),
                flow,
                id,
            });
        }

        Ok(Self {
            airports,
            routes,
            excluded_airports,
            dropped_routes,
        })
    }

    pub fn airport_count(&self) -> usize {
        self.airports.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn geo_points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.airports.iter().map(|airport| airport.geo)
    }

    pub fn flow_range(&self) -> Option<(f64, f64)> {
        self.airports.iter().fold(None, |range, airport| match range {
            None => Some((airport.flow, airport.flow)),
            Some((min, max)) => Some((min.min(airport.flow), max.max(airport.flow))),
        })
    }
}
