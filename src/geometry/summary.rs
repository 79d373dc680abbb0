//! Track summaries: point counts, bounds, and distance per collection.
//!
//! The renderer uses the active collection's bounds to focus the viewport;
//! the CLI summary view prints the rest.

use crate::geometry::aggregate::ActivityCollection;
use geojson::Value;
use serde::Serialize;

/// Geographic bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    fn from_point(longitude: f64, latitude: f64) -> Self {
        Self {
            min_lat: latitude,
            max_lat: latitude,
            min_lon: longitude,
            max_lon: longitude,
        }
    }

    fn include(&mut self, longitude: f64, latitude: f64) {
        self.min_lat = self.min_lat.min(latitude);
        self.max_lat = self.max_lat.max(latitude);
        self.min_lon = self.min_lon.min(longitude);
        self.max_lon = self.max_lon.max(longitude);
    }
}

/// Per-collection display summary.
#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub name: String,
    pub active: bool,
    pub point_count: u32,
    pub distance_km: f64,
    /// None when the collection has no geometry
    pub bounds: Option<GeoBounds>,
    pub sport: Option<String>,
}

/// Summarize one collection's geometry.
pub fn summarize(collection: &ActivityCollection) -> TrackSummary {
    let mut point_count = 0u32;
    let mut distance_meters = 0.0;
    let mut bounds: Option<GeoBounds> = None;

    for feature in &collection.features {
        if let Some(geometry) = &feature.geometry {
            match &geometry.value {
                Value::LineString(line) => {
                    let mut previous: Option<(f64, f64)> = None;
                    for position in line {
                        if let [longitude, latitude, ..] = position.as_slice() {
                            include_point(&mut bounds, *longitude, *latitude);
                            point_count += 1;
                            if let Some((prev_lon, prev_lat)) = previous {
                                distance_meters +=
                                    haversine_distance(prev_lat, prev_lon, *latitude, *longitude);
                            }
                            previous = Some((*longitude, *latitude));
                        }
                    }
                }
                Value::Point(position) => {
                    if let [longitude, latitude, ..] = position.as_slice() {
                        include_point(&mut bounds, *longitude, *latitude);
                        point_count += 1;
                    }
                }
                _ => {}
            }
        }
    }

    TrackSummary {
        name: collection.properties.name.clone(),
        active: collection.properties.active,
        point_count,
        distance_km: distance_meters / 1000.0,
        bounds,
        sport: collection.sport.clone(),
    }
}

fn include_point(bounds: &mut Option<GeoBounds>, longitude: f64, latitude: f64) {
    match bounds {
        Some(bounds) => bounds.include(longitude, latitude),
        None => *bounds = Some(GeoBounds::from_point(longitude, latitude)),
    }
}

/// Calculate horizontal distance between two GPS points (Haversine formula)
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS: f64 = 6_371_000.0; // meters

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS * c
}
