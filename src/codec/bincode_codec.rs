//! Bincode codec
//!
//! Compact binary encoding via serde + bincode.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

use super::Codec;

/// Default codec: bincode's standard configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}
