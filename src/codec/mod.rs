//! Codec Module
//!
//! Turns application values into durable bytes and back.
//!
//! Collections never look inside the bytes; any type implementing
//! [`Codec`] can be plugged into a collection. Failures must be reported
//! as [`SnapError::Encoding`](crate::SnapError::Encoding) so callers can
//! tell them apart from filesystem errors.

mod bincode_codec;

pub use bincode_codec::BincodeCodec;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Encode/decode capability used by collections
pub trait Codec: Send + Sync {
    /// Serialize `value` into an owned buffer
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize a value previously produced by `encode`
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}
