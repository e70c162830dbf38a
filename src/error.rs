//! Errors raised at the parse/emit boundary of the codec.
//!
//! Every fallible operation in this crate returns one of these two enums.
//! `UnknownItem` from the specification is not a hard error here: an item id
//! absent from the caller's catalog only changes how it is displayed (see
//! [`crate::payload::ItemCatalog`]), it never fails an operation.
use thiserror::Error;

/// Why an envelope string failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The string does not start with `BLUEPRINT:`.
    #[error("missing \"BLUEPRINT:\" prefix")]
    MissingPrefix,
    /// Splitting the body on `,` did not yield exactly 12 components.
    #[error("expected 12 comma-separated fields, found {found}")]
    WrongFieldCount { found: usize },
    /// Splitting the final component on `"` did not yield exactly 3 pieces.
    #[error("expected 3 quote-delimited segments in the trailing field, found {found}")]
    WrongQuoteCount { found: usize },
    /// A percent-encoded description could not be decoded as UTF-8.
    #[error("invalid percent encoding in description field")]
    BadPercentEncoding,
    /// A field expected to hold an integer did not parse as one.
    #[error("field {field} is not an integer: {value}")]
    NotAnInteger { field: &'static str, value: String },
    /// One of the two reserved zero fields was non-zero.
    #[error("reserved field {index} must be 0, found {value}")]
    ReservedFieldNonZero { index: u8, value: i64 },
}

/// Errors surfaced while parsing or emitting a blueprint envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The trailing fingerprint did not match the recomputed MD5F hash.
    #[error("blueprint string has invalid hash value")]
    InvalidHash,
    /// The envelope's ASCII framing is malformed.
    #[error("malformed blueprint envelope: {0}")]
    Malformed(#[from] MalformedReason),
    /// The embedded payload failed to decode.
    #[error("payload decode failed: {0}")]
    Payload(#[from] PayloadError),
    /// Reading or writing the blueprint file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors surfaced while decoding or encoding the binary payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Base64 decoding of the envelope body failed.
    #[error("base64 decode failed: {0}")]
    Base64(String),
    /// Gzip decompression of the base64-decoded bytes failed.
    #[error("gzip decompress failed: {0}")]
    Gzip(String),
    /// A fixed-width record extends past the end of the payload.
    #[error("short read: needed {needed} bytes, {available} available at offset {offset}")]
    ShortRead {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A declared count disagrees with the bytes actually reachable.
    #[error("inconsistent count: {what} declared {declared}, {trailing} bytes left over")]
    InconsistentCount {
        what: &'static str,
        declared: u64,
        trailing: usize,
    },
}
