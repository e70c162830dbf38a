//! The `BLUEPRINT:` ASCII envelope: comma-separated metadata, a gzip+base64
//! payload, and a trailing MD5F fingerprint.
//!
//! Grounded line-by-line in `original_source/Blueprint.py`'s
//! `from_blueprint_string`/`serialize`.
#[cfg(test)]
mod tests;

pub mod time;

use crate::error::{EnvelopeError, MalformedReason, PayloadError};
use crate::hash::{self, HashEngine, Variant};
use crate::payload::Payload;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io::{Read, Write};
use std::path::Path;

const PREFIX: &str = "BLUEPRINT:";

/// Safe set matching Python's `urllib.parse.quote` default (`safe='/'`):
/// only ASCII letters, digits, and `-_.~/` pass through unescaped.
const QUOTE_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, QUOTE_SAFE).to_string()
}

fn percent_decode(s: &str) -> Result<String, MalformedReason> {
    percent_decode_str(s)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|_| MalformedReason::BadPercentEncoding)
}

fn parse_i64(field: &'static str, value: &str) -> Result<i64, MalformedReason> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| MalformedReason::NotAnInteger { field, value: value.to_string() })
}

/// A fully parsed blueprint: envelope metadata plus the decompressed
/// payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    reserved0: i64,
    reserved1: i64,
    pub layout: i64,
    pub icons: [i64; 5],
    /// Raw C# ticks (100ns since `0001-01-01`). See [`time`] for calendar
    /// conversion; kept verbatim so idle round-trips never lose precision.
    pub ticks: i64,
    pub game_version: String,
    pub short_desc: String,
    pub long_desc: String,
    /// Decompressed payload bytes, decoded into a [`Payload`] on demand.
    pub payload: Vec<u8>,
}

impl Blueprint {
    /// Parse a blueprint string.
    ///
    /// When `validate_hash` is `true`, the trailing fingerprint must match
    /// the recomputed MD5F hash of the hashed body or this fails with
    /// [`EnvelopeError::InvalidHash`].
    pub fn parse(input: &str, validate_hash: bool) -> Result<Self, EnvelopeError> {
        let rest = input
            .strip_prefix(PREFIX)
            .ok_or(MalformedReason::MissingPrefix)?;

        let fields: Vec<&str> = rest.split(',').collect();
        if fields.len() != 12 {
            return Err(MalformedReason::WrongFieldCount { found: fields.len() }.into());
        }

        let tail_parts: Vec<&str> = fields[11].split('"').collect();
        if tail_parts.len() != 3 {
            return Err(MalformedReason::WrongQuoteCount { found: tail_parts.len() }.into());
        }
        let long_desc_enc = tail_parts[0];
        let b64_payload = tail_parts[1];
        let ref_hash = tail_parts[2];

        if validate_hash {
            // Exclude the closing `"` before the hex fingerprint too, matching
            // `serialize()`'s hashed body (`header,long_desc"b64`, no trailing quote).
            let body = &input[..input.len() - ref_hash.len() - 1];
            let computed = hash::hexdigest(Variant::Md5F, body.as_bytes());
            if computed != ref_hash.trim().to_lowercase() {
                return Err(EnvelopeError::InvalidHash);
            }
        }

        let reserved0 = parse_i64("reserved0", fields[0])?;
        if reserved0 != 0 {
            return Err(MalformedReason::ReservedFieldNonZero { index: 0, value: reserved0 }.into());
        }
        let layout = parse_i64("layout", fields[1])?;
        let mut icons = [0i64; 5];
        for (i, icon) in icons.iter_mut().enumerate() {
            *icon = parse_i64("icon", fields[2 + i])?;
        }
        let reserved1 = parse_i64("reserved1", fields[7])?;
        if reserved1 != 0 {
            return Err(MalformedReason::ReservedFieldNonZero { index: 1, value: reserved1 }.into());
        }
        let ticks = parse_i64("timestamp", fields[8])?;
        let game_version = fields[9].to_string();
        let short_desc = percent_decode(fields[10])?;
        let long_desc = percent_decode(long_desc_enc)?;

        let compressed = BASE64
            .decode(b64_payload)
            .map_err(|e| PayloadError::Base64(e.to_string()))?;
        let mut payload = Vec::new();
        GzDecoder::new(&compressed[..])
            .read_to_end(&mut payload)
            .map_err(|e| PayloadError::Gzip(e.to_string()))?;

        Ok(Self {
            reserved0,
            reserved1,
            layout,
            icons,
            ticks,
            game_version,
            short_desc,
            long_desc,
            payload,
        })
    }

    /// Serialize back into a blueprint string.
    ///
    /// Re-compresses [`Blueprint::payload`] at [`Compression::default`] —
    /// this reproduces the same decompressed bytes on the next parse (I3)
    /// but is not guaranteed to reproduce the exact original gzip stream
    /// byte for byte (see `DESIGN.md`, open question 2).
    pub fn serialize(&self) -> Result<String, EnvelopeError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&self.payload)
            .map_err(|e| PayloadError::Gzip(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| PayloadError::Gzip(e.to_string()))?;
        let b64 = BASE64.encode(&compressed);

        let short_desc_enc = percent_encode(&self.short_desc);
        let long_desc_enc = percent_encode(&self.long_desc);

        let header = format!(
            "{}{},{},{},{},{},{},{},{},{},{},{}",
            PREFIX,
            self.reserved0,
            self.layout,
            self.icons[0],
            self.icons[1],
            self.icons[2],
            self.icons[3],
            self.icons[4],
            self.reserved1,
            self.ticks,
            self.game_version,
            short_desc_enc,
        );

        let body = format!("{header},{long_desc_enc}\"{b64}");
        let fingerprint = hash::hexdigest(Variant::Md5F, body.as_bytes()).to_uppercase();
        Ok(format!("{body}\"{fingerprint}"))
    }

    /// Read and parse a blueprint from a file.
    pub fn read_from_file(path: &Path, validate_hash: bool) -> Result<Self, EnvelopeError> {
        let text = std::fs::read_to_string(path).map_err(|e| EnvelopeError::Io(e.to_string()))?;
        Self::parse(text.trim_end(), validate_hash)
    }

    /// Serialize and write a blueprint to a file.
    pub fn write_to_file(&self, path: &Path) -> Result<(), EnvelopeError> {
        let text = self.serialize()?;
        std::fs::write(path, text).map_err(|e| EnvelopeError::Io(e.to_string()))
    }

    /// Decode [`Blueprint::payload`] into a structured [`Payload`].
    pub fn decode_payload(&self) -> Result<Payload, PayloadError> {
        Payload::decode(&self.payload)
    }

    /// Replace a decoded payload's building item ids and re-encode
    /// [`Blueprint::payload`] in place. Returns the number of buildings
    /// changed.
    pub fn replace_item(&mut self, search: u16, replacement: u16) -> Result<usize, PayloadError> {
        let mut payload = self.decode_payload()?;
        let changed = payload.replace_item(search, replacement);
        if changed > 0 {
            self.payload = payload.encode();
        }
        Ok(changed)
    }

    /// Calendar timestamp derived from [`Blueprint::ticks`].
    pub fn timestamp(&self) -> chrono::NaiveDateTime {
        time::csharp_to_datetime(self.ticks)
    }

    /// Set the timestamp, truncating to whole seconds in the stored ticks
    /// (see `DESIGN.md`, open question 3).
    pub fn set_timestamp(&mut self, datetime: chrono::NaiveDateTime) {
        self.ticks = time::datetime_to_csharp(datetime);
    }

    /// Render this blueprint as a JSON-ready structured value for the
    /// external JSON-rendering collaborator. The payload is decoded when
    /// possible; a payload that fails to decode is rendered as `null`
    /// alongside its error message rather than failing the whole call.
    pub fn to_dict(&self) -> serde_json::Value {
        let payload_value = match self.decode_payload() {
            Ok(payload) => serde_json::to_value(&payload).unwrap_or(serde_json::Value::Null),
            Err(err) => {
                tracing::warn!(error = %err, "payload failed to decode while rendering to_dict");
                serde_json::Value::Null
            }
        };

        serde_json::json!({
            "layout": self.layout,
            "icons": self.icons,
            "timestamp_ticks": self.ticks,
            "timestamp": self.timestamp().to_string(),
            "game_version": self.game_version,
            "short_desc": self.short_desc,
            "long_desc": self.long_desc,
            "payload": payload_value,
        })
    }
}
