//! Programmatic FIT file construction for decoder tests.
//!
//! Emits a 14-byte header, a definition/data message stream, and both CRC
//! seals, so the binary decoder is exercised on structurally real bytes
//! without binary fixtures in the repository.

use tracksketch::import::fit::crc16;

const HEADER_SIZE: u8 = 14;
const PROTOCOL_VERSION: u8 = 0x20;
const PROFILE_VERSION: u16 = 2100;

const FILE_ID_GLOBAL: u16 = 0;
const SESSION_GLOBAL: u16 = 18;
const RECORD_GLOBAL: u16 = 20;

const BASE_TYPE_ENUM: u8 = 0x00;
const BASE_TYPE_UINT8: u8 = 0x02;
const BASE_TYPE_SINT32: u8 = 0x85;
const BASE_TYPE_UINT32: u8 = 0x86;

/// Seconds since the FIT epoch for a plausible 2021 wall-clock time.
pub const BASE_TIMESTAMP: u32 = 1_000_000_000;

/// Builds a single-activity FIT file one message at a time.
pub struct FitFileBuilder {
    body: Vec<u8>,
    record_defined: bool,
    bare_record_defined: bool,
    session_defined: bool,
}

impl Default for FitFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitFileBuilder {
    /// Start a file; a `file_id` message is always emitted first.
    pub fn new() -> Self {
        let mut builder = Self {
            body: Vec::new(),
            record_defined: false,
            bare_record_defined: false,
            session_defined: false,
        };
        builder.define(
            3,
            FILE_ID_GLOBAL,
            &[(0, 1, BASE_TYPE_ENUM), (4, 4, BASE_TYPE_UINT32)],
        );
        builder.body.push(0x03);
        builder.body.push(4); // type = activity
        builder.body.extend_from_slice(&BASE_TIMESTAMP.to_le_bytes());
        builder
    }

    /// Append a `record` message with a position.
    pub fn record(mut self, timestamp: u32, lat_semicircles: i32, lon_semicircles: i32) -> Self {
        if !self.record_defined {
            self.define(
                0,
                RECORD_GLOBAL,
                &[
                    (253, 4, BASE_TYPE_UINT32), // timestamp
                    (0, 4, BASE_TYPE_SINT32),   // position_lat
                    (1, 4, BASE_TYPE_SINT32),   // position_long
                ],
            );
            self.record_defined = true;
        }
        self.body.push(0x00);
        self.body.extend_from_slice(&timestamp.to_le_bytes());
        self.body.extend_from_slice(&lat_semicircles.to_le_bytes());
        self.body.extend_from_slice(&lon_semicircles.to_le_bytes());
        self
    }

    /// Append a `record` message without position fields (heart rate only).
    #[allow(dead_code)]
    pub fn bare_record(mut self, timestamp: u32, heart_rate: u8) -> Self {
        if !self.bare_record_defined {
            self.define(
                2,
                RECORD_GLOBAL,
                &[
                    (253, 4, BASE_TYPE_UINT32), // timestamp
                    (3, 1, BASE_TYPE_UINT8),    // heart_rate
                ],
            );
            self.bare_record_defined = true;
        }
        self.body.push(0x02);
        self.body.extend_from_slice(&timestamp.to_le_bytes());
        self.body.push(heart_rate);
        self
    }

    /// Append a `session` message carrying a sport (2 = cycling).
    pub fn session(mut self, sport: u8) -> Self {
        if !self.session_defined {
            self.define(
                1,
                SESSION_GLOBAL,
                &[
                    (253, 4, BASE_TYPE_UINT32), // timestamp
                    (5, 1, BASE_TYPE_ENUM),     // sport
                ],
            );
            self.session_defined = true;
        }
        self.body.push(0x01);
        self.body.extend_from_slice(&BASE_TIMESTAMP.to_le_bytes());
        self.body.push(sport);
        self
    }

    /// Finalize: header with patched data size, header CRC over the first 12
    /// bytes, message stream, trailing file CRC over everything before it.
    pub fn build(&self) -> Vec<u8> {
        let mut file = Vec::with_capacity(HEADER_SIZE as usize + self.body.len() + 2);
        file.push(HEADER_SIZE);
        file.push(PROTOCOL_VERSION);
        file.extend_from_slice(&PROFILE_VERSION.to_le_bytes());
        file.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        file.extend_from_slice(b".FIT");
        let header_crc = crc16(&file[..12]);
        file.extend_from_slice(&header_crc.to_le_bytes());

        file.extend_from_slice(&self.body);

        let file_crc = crc16(&file);
        file.extend_from_slice(&file_crc.to_le_bytes());
        file
    }

    /// Build, then flip a bit in the trailing file CRC.
    #[allow(dead_code)]
    pub fn build_with_bad_crc(&self) -> Vec<u8> {
        let mut file = self.build();
        let last = file.len() - 1;
        file[last] ^= 0xFF;
        file
    }

    /// Build, then append bytes beyond the declared length.
    #[allow(dead_code)]
    pub fn build_with_trailing(&self, garbage: &[u8]) -> Vec<u8> {
        let mut file = self.build();
        file.extend_from_slice(garbage);
        file
    }

    /// Build, then cut the buffer off mid-stream.
    #[allow(dead_code)]
    pub fn build_truncated(&self, keep: usize) -> Vec<u8> {
        let mut file = self.build();
        file.truncate(keep);
        file
    }

    fn define(&mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) {
        self.body.push(0x40 | (local & 0x0F));
        self.body.push(0); // reserved
        self.body.push(0); // architecture: little endian
        self.body.extend_from_slice(&global.to_le_bytes());
        self.body.push(fields.len() as u8);
        for (number, size, base_type) in fields {
            self.body.push(*number);
            self.body.push(*size);
            self.body.push(*base_type);
        }
    }
}
