//! FIT binary activity decoder.
//!
//! Validates the fixed-size header and CRC-16 integrity seals before handing
//! the message stream to `fitparser`. Integrity failures are warnings, not
//! errors: the checked copy is re-sealed so the message stream can still be
//! read, and whatever decodes is returned best-effort.

use super::{DecodeError, DecodeWarning};
use chrono::{DateTime, Utc};

/// Legacy FIT header size (no header CRC).
const FIT_HEADER_SIZE_LEGACY: usize = 12;

/// Extended FIT header size (trailing two-byte header CRC).
const FIT_HEADER_SIZE: usize = 14;

/// Magic signature at header offset 8.
const FIT_MAGIC: &[u8; 4] = b".FIT";

/// Length of the trailing file CRC.
const FIT_CRC_LEN: usize = 2;

/// One decoded message from the FIT stream, tagged by kind.
///
/// Only `record` messages carry geometry; `session` messages contribute sport
/// metadata; everything else is retained as auxiliary data.
#[derive(Debug, Clone, PartialEq)]
pub enum FitMessage {
    Record(RecordMessage),
    Session { sport: Option<String> },
    Other { kind: fitparser::profile::MesgNum },
}

/// One decoded `record` message.
///
/// Position components are kept in raw semicircles; conversion to degrees is
/// the aggregator's job. A record missing either component is invalid for
/// geometry but still useful as data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMessage {
    /// Sample timestamp
    pub timestamp: Option<DateTime<Utc>>,
    /// Latitude in semicircles
    pub position_lat: Option<i32>,
    /// Longitude in semicircles
    pub position_long: Option<i32>,
    /// Altitude in meters
    pub altitude: Option<f64>,
    /// Speed in meters per second
    pub speed: Option<f64>,
    /// Cumulative distance in meters
    pub distance: Option<f64>,
    /// Heart rate in bpm
    pub heart_rate: Option<u8>,
    /// Cadence in rpm
    pub cadence: Option<u8>,
    /// Temperature in degrees Celsius
    pub temperature: Option<f64>,
}

impl RecordMessage {
    /// Raw (longitude, latitude) semicircle pair, when both components are
    /// present.
    pub fn raw_position(&self) -> Option<(i32, i32)> {
        match (self.position_long, self.position_lat) {
            (Some(longitude), Some(latitude)) => Some((longitude, latitude)),
            _ => None,
        }
    }
}

/// Result of decoding one FIT buffer: messages plus a parallel error list.
#[derive(Debug, Clone, Default)]
pub struct FitDecode {
    pub messages: Vec<FitMessage>,
    pub errors: Vec<DecodeError>,
    pub warnings: Vec<DecodeWarning>,
}

impl FitDecode {
    /// Iterate over the decoded `record` messages in stream order.
    pub fn records(&self) -> impl Iterator<Item = &RecordMessage> {
        self.messages.iter().filter_map(|message| match message {
            FitMessage::Record(record) => Some(record),
            _ => None,
        })
    }

    /// Sport reported by the first `session` message, if any.
    pub fn sport(&self) -> Option<&str> {
        self.messages.iter().find_map(|message| match message {
            FitMessage::Session { sport } => sport.as_deref(),
            _ => None,
        })
    }

    /// True when at least one record carries a complete position.
    ///
    /// Lets callers tell "parsed, but no GPS fix anywhere" apart from
    /// "format rejected" (which leaves `messages` empty and `errors`
    /// non-empty).
    pub fn has_position_data(&self) -> bool {
        self.records().any(|record| record.raw_position().is_some())
    }
}

/// Check the fixed-size header: plausible size byte and `.FIT` magic.
pub fn is_fit(bytes: &[u8]) -> bool {
    if bytes.len() < FIT_HEADER_SIZE_LEGACY {
        return false;
    }
    let header_size = bytes[0] as usize;
    if header_size != FIT_HEADER_SIZE_LEGACY && header_size != FIT_HEADER_SIZE {
        return false;
    }
    if bytes.len() < header_size {
        return false;
    }
    &bytes[8..12] == FIT_MAGIC
}

/// Calculate the FIT CRC-16 over a byte slice.
///
/// This is the checksum sealing both the extended header (over its first 12
/// bytes) and the whole file (over header plus data).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    let crc_table: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    for byte in data {
        let tmp = crc_table[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ crc_table[(*byte & 0xF) as usize];

        let tmp = crc_table[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ crc_table[((*byte >> 4) & 0xF) as usize];
    }

    crc
}

/// Decode a FIT buffer best-effort.
///
/// Never panics and never returns early with a bare error: signature rejects,
/// integrity findings, and parse failures all land in the returned
/// [`FitDecode`] alongside whatever messages were extracted.
pub fn decode(bytes: &[u8]) -> FitDecode {
    let mut result = FitDecode::default();

    if !is_fit(bytes) {
        result.errors.push(DecodeError::SignatureMismatch);
        return result;
    }

    let header_size = bytes[0] as usize;
    let data_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let declared_len = header_size + data_size + FIT_CRC_LEN;

    // Owned copy: the integrity seals may need re-writing below.
    let mut buffer = bytes.to_vec();

    if buffer.len() > declared_len {
        result.warnings.push(DecodeWarning::TrailingBytes {
            count: buffer.len() - declared_len,
        });
        buffer.truncate(declared_len);
    }

    // Header CRC covers the first 12 bytes of an extended header; a stored
    // value of zero means "not computed".
    if header_size == FIT_HEADER_SIZE {
        let stored = u16::from_le_bytes([buffer[12], buffer[13]]);
        if stored != 0 {
            let computed = crc16(&buffer[..12]);
            if stored != computed {
                result
                    .warnings
                    .push(DecodeWarning::IntegrityCheckFailed { stored, computed });
            }
        }
    }

    // File CRC covers everything up to the trailing two bytes. A buffer
    // shorter than declared has no checksum to verify; the message parser
    // reports the truncation instead.
    if buffer.len() == declared_len {
        let crc_offset = declared_len - FIT_CRC_LEN;
        let stored = u16::from_le_bytes([buffer[crc_offset], buffer[crc_offset + 1]]);
        let computed = crc16(&buffer[..crc_offset]);
        if stored != computed {
            result
                .warnings
                .push(DecodeWarning::IntegrityCheckFailed { stored, computed });
        }
    }

    // Re-seal a failed copy so the message parser's own validation accepts
    // it and the best-effort decode can proceed.
    let integrity_failed = result
        .warnings
        .iter()
        .any(|warning| matches!(warning, DecodeWarning::IntegrityCheckFailed { .. }));
    if integrity_failed {
        if header_size == FIT_HEADER_SIZE {
            let header_crc = crc16(&buffer[..12]).to_le_bytes();
            buffer[12..14].copy_from_slice(&header_crc);
        }
        if buffer.len() == declared_len {
            let crc_offset = declared_len - FIT_CRC_LEN;
            let file_crc = crc16(&buffer[..crc_offset]).to_le_bytes();
            buffer[crc_offset..].copy_from_slice(&file_crc);
        }
    }

    match fitparser::from_bytes(&buffer) {
        Ok(records) => {
            for record in &records {
                result.messages.push(map_message(record));
            }
        }
        Err(e) => {
            result
                .errors
                .push(DecodeError::Parse(format!("FIT parse error: {}", e)));
        }
    }

    result
}

fn map_message(record: &fitparser::FitDataRecord) -> FitMessage {
    match record.kind() {
        fitparser::profile::MesgNum::Record => FitMessage::Record(map_record(record)),
        fitparser::profile::MesgNum::Session => FitMessage::Session {
            sport: extract_sport(record),
        },
        kind => FitMessage::Other { kind },
    }
}

fn map_record(record: &fitparser::FitDataRecord) -> RecordMessage {
    let mut message = RecordMessage::default();

    for field in record.fields() {
        match field.name() {
            "timestamp" => {
                if let fitparser::Value::Timestamp(t) = field.value() {
                    message.timestamp = Some((*t).into());
                }
            }
            "position_lat" => {
                if let fitparser::Value::SInt32(v) = field.value() {
                    message.position_lat = Some(*v);
                }
            }
            "position_long" => {
                if let fitparser::Value::SInt32(v) = field.value() {
                    message.position_long = Some(*v);
                }
            }
            "altitude" | "enhanced_altitude" => {
                if let Some(v) = value_to_f64(field.value()) {
                    message.altitude = Some(v);
                }
            }
            "speed" | "enhanced_speed" => {
                if let Some(v) = value_to_f64(field.value()) {
                    message.speed = Some(v);
                }
            }
            "distance" => {
                if let Some(v) = value_to_f64(field.value()) {
                    message.distance = Some(v);
                }
            }
            "heart_rate" => {
                if let fitparser::Value::UInt8(v) = field.value() {
                    message.heart_rate = Some(*v);
                }
            }
            "cadence" => {
                if let fitparser::Value::UInt8(v) = field.value() {
                    message.cadence = Some(*v);
                }
            }
            "temperature" => {
                if let Some(v) = value_to_f64(field.value()) {
                    message.temperature = Some(v);
                }
            }
            _ => {}
        }
    }

    message
}

fn extract_sport(record: &fitparser::FitDataRecord) -> Option<String> {
    record.fields().iter().find_map(|field| {
        if field.name() == "sport" {
            if let fitparser::Value::String(sport) = field.value() {
                return Some(sport.clone());
            }
        }
        None
    })
}

/// Coerce any numeric field value to f64.
fn value_to_f64(value: &fitparser::Value) -> Option<f64> {
    match value {
        fitparser::Value::SInt8(v) => Some(*v as f64),
        fitparser::Value::UInt8(v) => Some(*v as f64),
        fitparser::Value::SInt16(v) => Some(*v as f64),
        fitparser::Value::UInt16(v) => Some(*v as f64),
        fitparser::Value::SInt32(v) => Some(*v as f64),
        fitparser::Value::UInt32(v) => Some(*v as f64),
        fitparser::Value::SInt64(v) => Some(*v as f64),
        fitparser::Value::UInt64(v) => Some(*v as f64),
        fitparser::Value::Float32(v) => Some(*v as f64),
        fitparser::Value::Float64(v) => Some(*v),
        fitparser::Value::UInt8z(v) => Some(*v as f64),
        fitparser::Value::UInt16z(v) => Some(*v as f64),
        fitparser::Value::UInt32z(v) => Some(*v as f64),
        fitparser::Value::UInt64z(v) => Some(*v as f64),
        _ => None,
    }
}
