//! Activity file decoding: format detection, FIT and GPX decoders, coordinate
//! normalization, and the shared error taxonomy.
//!
//! Decoding never fails the whole session: fatal per-file problems are carried
//! as [`DecodeError`] values, recoverable findings as [`DecodeWarning`], both
//! alongside whatever payload was extracted.

pub mod coords;
pub mod fit;
pub mod gpx;

use std::sync::Arc;
use thiserror::Error;

/// An uploaded activity file held in memory.
///
/// Bytes are reference-counted so concurrent decode tasks can share the buffer
/// without copying. The file name doubles as the session identity key.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFile {
    /// Original file name, unique within a session
    pub name: String,
    /// Declared media type, if the source advertised one
    pub media_type: Option<String>,
    /// Raw file contents
    pub bytes: Arc<Vec<u8>>,
}

impl TrackFile {
    /// Create a file with no declared media type.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: None,
            bytes: Arc::new(bytes),
        }
    }

    /// Create a file with a declared media type.
    pub fn with_media_type(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: Some(media_type.into()),
            bytes: Arc::new(bytes),
        }
    }
}

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fit,
    Gpx,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Fit => "fit",
            FileFormat::Gpx => "gpx",
        }
    }
}

/// Fatal per-file decode failures.
///
/// These are recovered at the aggregation boundary: a failed file contributes
/// an empty collection carrying the error, never a panic or early return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Unsupported format: {0}")]
    UnknownFormat(String),

    #[error("Header signature mismatch: not a FIT file")]
    SignatureMismatch,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Non-fatal decode findings; the decoded payload remains usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeWarning {
    #[error("Integrity check failed: stored CRC {stored:#06x}, computed {computed:#06x}")]
    IntegrityCheckFailed { stored: u16, computed: u16 },

    #[error("{count} trailing bytes beyond declared length ignored")]
    TrailingBytes { count: usize },

    #[error("Point {index} out of range: ({longitude:.4}, {latitude:.4})")]
    OutOfRangePoint {
        index: usize,
        longitude: f64,
        latitude: f64,
    },

    #[error("{count} zero-origin points skipped")]
    ZeroOriginSkipped { count: u32 },
}

/// Errors and warnings produced while decoding one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeReport {
    pub errors: Vec<DecodeError>,
    pub warnings: Vec<DecodeWarning>,
}

impl DecodeReport {
    /// True when decoding produced neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// True when at least one fatal error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Decode policy options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep samples whose raw coordinates are both exactly zero.
    ///
    /// A (0, 0) pair cannot be told apart from an unset sentinel; the default
    /// treats it as a genuine equator/prime-meridian fix and keeps it. When
    /// disabled, skipped pairs are counted in a
    /// [`DecodeWarning::ZeroOriginSkipped`] warning.
    pub include_zero_origin: bool,
    /// Drop points whose converted coordinates fall outside valid bounds.
    ///
    /// The default keeps such points and surfaces them as
    /// [`DecodeWarning::OutOfRangePoint`]; either way the condition is never
    /// silent.
    pub drop_out_of_range: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            include_zero_origin: true,
            drop_out_of_range: false,
        }
    }
}

/// Detect a file's format from its declared media type, falling back to the
/// lowercase file-name extension.
///
/// Only the FIT and GPX allow-list is accepted; anything else is
/// [`DecodeError::UnknownFormat`].
pub fn detect_format(file: &TrackFile) -> Result<FileFormat, DecodeError> {
    if let Some(declared) = file.media_type.as_deref().filter(|t| !t.is_empty()) {
        return match declared.to_ascii_lowercase().as_str() {
            "fit" | "application/fit" | "application/vnd.ant.fit" => Ok(FileFormat::Fit),
            "gpx" | "application/gpx" | "application/gpx+xml" => Ok(FileFormat::Gpx),
            other => Err(DecodeError::UnknownFormat(other.to_string())),
        };
    }

    let extension = file
        .name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());

    match extension.as_deref() {
        Some("fit") => Ok(FileFormat::Fit),
        Some("gpx") => Ok(FileFormat::Gpx),
        Some(other) => Err(DecodeError::UnknownFormat(other.to_string())),
        None => Err(DecodeError::UnknownFormat(file.name.clone())),
    }
}
