//! Geometry aggregation: per-file GeoJSON collections, active-selection
//! marking, and track summaries.

pub mod aggregate;
pub mod summary;

pub use aggregate::{
    aggregate, aggregate_with_options, collection_id, decode_collection, mark_active,
    ActivityCollection, CollectionProperties,
};
pub use summary::{haversine_distance, summarize, GeoBounds, TrackSummary};
