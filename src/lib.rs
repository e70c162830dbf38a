//! `dspbptk`: codec for Dyson Sphere Program blueprint strings.
//!
//! Reads, validates, and rewrites the `BLUEPRINT:...` ASCII envelope that the
//! game exports: a comma-separated metadata header, a gzip+base64 payload
//! describing placed areas and buildings, and a trailing MD5-variant
//! fingerprint. The crate exposes only the codec itself — command-line
//! dispatch, an item-name catalog, and JSON rendering are left to callers.
pub mod codec;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod payload;

pub use envelope::Blueprint;
pub use error::{EnvelopeError, MalformedReason, PayloadError};
pub use hash::{HashEngine, Variant};
pub use payload::{Area, Building, ItemCatalog, Payload, PayloadHeader};
