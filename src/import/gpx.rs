//! GPX track decoder.
//!
//! GPX already matches the normalized output closely, so this path produces
//! renderer-ready features directly: one LineString per track segment, one
//! LineString per route, one Point per standalone waypoint.

use super::DecodeError;
use geojson::{Feature, Geometry, JsonObject, Value};

/// Result of decoding one GPX buffer.
#[derive(Debug, Clone, Default)]
pub struct GpxDecode {
    pub features: Vec<Feature>,
    pub errors: Vec<DecodeError>,
}

impl GpxDecode {
    /// True when the document parsed but contained no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.errors.is_empty()
    }
}

/// Decode a GPX buffer into geographic features.
///
/// Malformed XML or invalid UTF-8 yields a [`DecodeError::Parse`] with zero
/// features; a well-formed document with no tracks yields zero features and
/// zero errors.
pub fn decode(bytes: &[u8]) -> GpxDecode {
    let mut result = GpxDecode::default();

    let content = match std::str::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            result
                .errors
                .push(DecodeError::Parse(format!("Invalid UTF-8: {}", e)));
            return result;
        }
    };

    let document: gpx::Gpx = match gpx::read(content.as_bytes()) {
        Ok(document) => document,
        Err(e) => {
            result
                .errors
                .push(DecodeError::Parse(format!("GPX parse error: {}", e)));
            return result;
        }
    };

    for track in &document.tracks {
        for segment in &track.segments {
            let coordinates: Vec<Vec<f64>> = segment
                .points
                .iter()
                .map(|point| vec![point.point().x(), point.point().y()])
                .collect();

            let mut properties = JsonObject::new();
            if let Some(name) = &track.name {
                properties.insert("name".to_string(), name.clone().into());
            }
            if let Some(description) = &track.description {
                properties.insert("desc".to_string(), description.clone().into());
            }
            if let Some(track_type) = &track.type_ {
                properties.insert("type".to_string(), track_type.clone().into());
            }

            result.features.push(line_feature(coordinates, properties));
        }
    }

    for route in &document.routes {
        let coordinates: Vec<Vec<f64>> = route
            .points
            .iter()
            .map(|point| vec![point.point().x(), point.point().y()])
            .collect();

        let mut properties = JsonObject::new();
        if let Some(name) = &route.name {
            properties.insert("name".to_string(), name.clone().into());
        }

        result.features.push(line_feature(coordinates, properties));
    }

    for waypoint in &document.waypoints {
        let mut properties = JsonObject::new();
        if let Some(name) = &waypoint.name {
            properties.insert("name".to_string(), name.clone().into());
        }
        if let Some(elevation) = waypoint.elevation {
            properties.insert("ele".to_string(), elevation.into());
        }

        result.features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                waypoint.point().x(),
                waypoint.point().y(),
            ]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    result
}

fn line_feature(coordinates: Vec<Vec<f64>>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coordinates))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
