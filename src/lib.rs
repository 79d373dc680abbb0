//! Tracksketch - activity file decoding for map rendering
//!
//! Decodes Garmin FIT binaries and GPX XML tracks into normalized GeoJSON
//! feature collections: stable per-file identity, coordinates in source
//! order, exactly one active (focused) collection per session, and
//! structured per-file error reports instead of thrown failures.

pub mod config;
pub mod geometry;
pub mod import;
pub mod session;

// Re-export commonly used types
pub use geometry::{aggregate, ActivityCollection, CollectionProperties};
pub use import::{
    detect_format, DecodeError, DecodeOptions, DecodeReport, DecodeWarning, FileFormat, TrackFile,
};
pub use session::{FileStore, RouteLoader};
