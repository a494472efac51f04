use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportRecord {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub geo_lat: f64,
    pub geo_lon: f64,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub source: String,
    pub destination: String,
    pub weight: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub airports: Vec<AirportRecord>,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let dataset: Dataset = serde_json::from_str(raw).context("invalid flight dataset JSON")?;

    if dataset.airports.is_empty() {
        return Err(anyhow!("flight dataset contains no airports"));
    }

    Ok(dataset)
}

pub(super) fn normalize_id(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}
