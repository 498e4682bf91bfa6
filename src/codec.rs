//! Value codec boundary
//!
//! The engine never interprets value bytes: encoding a value to bytes and
//! back is delegated to a [`ValueCodec`] supplied at construction. The
//! encoded length is recorded verbatim in the owning record; there is no
//! escaping or extra length-prefixing on top.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use crate::error::{ChainError, Result};

/// Pluggable transform between a value and its persisted byte run
pub trait ValueCodec {
    /// The value type this codec handles
    type Value;

    /// Encode a value to bytes
    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>>;

    /// Decode a value back from its persisted bytes
    ///
    /// Fails with [`ChainError::Codec`] when the bytes do not decode to a
    /// value of the expected type.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Value>;
}

/// Default codec: compact binary encoding via serde + bincode
///
/// Stateless; one instance serves any number of stores over the same value
/// type.
#[derive(Debug)]
pub struct BincodeCodec<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> BincodeCodec<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for BincodeCodec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ValueCodec for BincodeCodec<V>
where
    V: Serialize + DeserializeOwned,
{
    type Value = V;

    fn encode(&self, value: &V) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(|e| ChainError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<V> {
        bincode::deserialize(bytes).map_err(|e| ChainError::Codec(e.to_string()))
    }
}
