//! Per-file GeoJSON collection building and multi-file aggregation.
//!
//! One [`ActivityCollection`] per uploaded file, in file-set order, with
//! exactly one (or zero) marked active. A file that fails to decode
//! contributes an empty collection carrying its error detail; it never aborts
//! the rest of the session.

use crate::import::{
    coords, detect_format, fit, gpx, DecodeOptions, DecodeReport, DecodeWarning, FileFormat,
    TrackFile,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

/// Collection-level properties consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionProperties {
    /// Deterministic identity derived from the file name
    pub id: String,
    /// Original file name
    pub name: String,
    /// True for the session's focused collection
    pub active: bool,
}

/// Per-file aggregate: renderer properties, decoded features, and the decode
/// report for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCollection {
    pub properties: CollectionProperties,
    pub features: Vec<Feature>,
    pub report: DecodeReport,
    /// Sport reported by a FIT session message, if any
    pub sport: Option<String>,
}

impl ActivityCollection {
    /// Render as a GeoJSON feature collection.
    ///
    /// The collection-level properties ride along as a foreign member, so the
    /// serialized shape is
    /// `{ "type": "FeatureCollection", "properties": {...}, "features": [...] }`.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut foreign = JsonObject::new();
        foreign.insert(
            "properties".to_string(),
            serde_json::json!({
                "id": self.properties.id,
                "name": self.properties.name,
                "active": self.properties.active,
            }),
        );

        FeatureCollection {
            bbox: None,
            features: self.features.clone(),
            foreign_members: Some(foreign),
        }
    }
}

/// Derive the stable collection identity from a file name.
///
/// Standard Base64 keeps the encoding deterministic and injective, so the
/// renderer can diff added/removed sources across re-decodes.
pub fn collection_id(name: &str) -> String {
    STANDARD.encode(name.as_bytes())
}

/// Decode one file into its collection. Pure: no I/O, no shared state.
pub fn decode_collection(file: &TrackFile, options: &DecodeOptions) -> ActivityCollection {
    let mut report = DecodeReport::default();
    let mut features = Vec::new();
    let mut sport = None;

    match detect_format(file) {
        Ok(FileFormat::Fit) => {
            let decoded = fit::decode(&file.bytes);
            sport = decoded.sport().map(str::to_string);

            // "Format rejected" leaves no features at all; a parse that
            // yielded messages (even without positions) still produces a
            // line feature so the two states stay distinguishable.
            let rejected = !decoded.errors.is_empty() && decoded.messages.is_empty();
            if !rejected {
                let coordinates = normalize_records(&decoded, options, &mut report);
                features.push(Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::LineString(coordinates))),
                    id: None,
                    properties: Some(JsonObject::new()),
                    foreign_members: None,
                });
            }

            report.errors.extend(decoded.errors);
            report.warnings.extend(decoded.warnings);
        }
        Ok(FileFormat::Gpx) => {
            let decoded = gpx::decode(&file.bytes);
            features = decoded.features;
            report.errors.extend(decoded.errors);
        }
        Err(error) => {
            report.errors.push(error);
        }
    }

    if report.has_errors() {
        tracing::warn!(
            file = %file.name,
            errors = report.errors.len(),
            "File decoded with errors"
        );
    } else {
        tracing::debug!(
            file = %file.name,
            features = features.len(),
            warnings = report.warnings.len(),
            "File decoded"
        );
    }

    ActivityCollection {
        properties: CollectionProperties {
            id: collection_id(&file.name),
            name: file.name.clone(),
            active: false,
        },
        features,
        report,
        sport,
    }
}

/// Convert the valid position records to degree pairs in stream order,
/// applying the zero-origin and out-of-range policies.
fn normalize_records(
    decoded: &fit::FitDecode,
    options: &DecodeOptions,
    report: &mut DecodeReport,
) -> Vec<Vec<f64>> {
    let mut coordinates: Vec<Vec<f64>> = Vec::new();
    let mut zero_origin_skipped = 0u32;

    for record in decoded.records() {
        if let Some((raw_longitude, raw_latitude)) = record.raw_position() {
            if raw_longitude == 0 && raw_latitude == 0 && !options.include_zero_origin {
                zero_origin_skipped += 1;
                continue;
            }

            let longitude = coords::semicircles_to_degrees(raw_longitude);
            let latitude = coords::semicircles_to_degrees(raw_latitude);

            if !coords::in_range(longitude, latitude) {
                report.warnings.push(DecodeWarning::OutOfRangePoint {
                    index: coordinates.len(),
                    longitude,
                    latitude,
                });
                if options.drop_out_of_range {
                    continue;
                }
            }

            coordinates.push(vec![longitude, latitude]);
        }
    }

    if zero_origin_skipped > 0 {
        report.warnings.push(DecodeWarning::ZeroOriginSkipped {
            count: zero_origin_skipped,
        });
    }

    coordinates
}

/// Decode every file in set order and mark the active collection.
///
/// Pure function of the inputs: same files and index always produce the same
/// collections. An empty file list produces an empty output; an out-of-range
/// index leaves every collection inactive.
pub fn aggregate(files: &[TrackFile], active_index: usize) -> Vec<ActivityCollection> {
    aggregate_with_options(files, active_index, &DecodeOptions::default())
}

/// [`aggregate`] with explicit decode policy options.
pub fn aggregate_with_options(
    files: &[TrackFile],
    active_index: usize,
    options: &DecodeOptions,
) -> Vec<ActivityCollection> {
    let mut collections: Vec<ActivityCollection> = files
        .iter()
        .map(|file| decode_collection(file, options))
        .collect();
    mark_active(&mut collections, active_index);

    tracing::debug!(
        files = files.len(),
        active_index,
        "Aggregated session collections"
    );

    collections
}

/// Mark the collection at `active_index` active and all others inactive.
pub fn mark_active(collections: &mut [ActivityCollection], active_index: usize) {
    for (index, collection) in collections.iter_mut().enumerate() {
        collection.properties.active = index == active_index;
    }
}
