//! CBOR application serializer.

use std::marker::PhantomData;

use bytes::Bytes;
use sealcall_core::{CallError, Codec, CodecError};
use serde::{Serialize, de::DeserializeOwned};

/// [`Codec`] for any serde type, encoded as CBOR.
pub struct CborCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> CborCodec<T> {
    /// Create a codec.
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for CborCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for CborCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, item: &T) -> Result<Bytes, CallError> {
        let mut buf = Vec::new();
        ciborium::into_writer(item, &mut buf)
            .map_err(|err| CodecError::Encode(err.to_string()))?;
        Ok(Bytes::from(buf))
    }

    fn decode(&self, wire: Bytes) -> Result<T, CallError> {
        ciborium::from_reader(wire.as_ref())
            .map_err(|err| CodecError::Decode(err.to_string()).into())
    }
}
