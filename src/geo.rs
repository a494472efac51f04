use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::sim::Canvas;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Maps geographic coordinates onto canvas coordinates.
pub trait Projection {
    fn project(&self, point: GeoPoint) -> Vec2;
}

impl<F> Projection for F
where
    F: Fn(GeoPoint) -> Vec2,
{
    fn project(&self, point: GeoPoint) -> Vec2 {
        self(point)
    }
}

/// Continuous linear scale from a domain interval onto a range interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() < f64::EPSILON || !span.is_finite() {
            return (r0 + r1) * 0.5;
        }
        r0 + ((value - d0) / span) * (r1 - r0)
    }
}

/// Longitude/latitude scales fitted to a canvas, north up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |range, value| match range {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

impl GeoScales {
    pub fn fit(points: &[GeoPoint], canvas: Canvas, margin: f32) -> Self {
        let margin = f64::from(margin.max(0.0));
        let width = f64::from(canvas.width);
        let height = f64::from(canvas.height);
        let lon = extent(points.iter().map(|point| point.lon)).unwrap_or((-180.0, 180.0));
        let lat = extent(points.iter().map(|point| point.lat)).unwrap_or((-90.0, 90.0));

        Self {
            x: LinearScale::new(lon, (margin, (width - margin).max(margin))),
            y: LinearScale::new(lat, ((height - margin).max(margin), margin)),
        }
    }
}

impl Projection for GeoScales {
    fn project(&self, point: GeoPoint) -> Vec2 {
        vec2(self.x.apply(point.lon) as f32, self.y.apply(point.lat) as f32)
    }
}
