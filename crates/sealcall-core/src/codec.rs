//! Message serializer seam.

use bytes::Bytes;

use crate::error::CallError;

/// Serializer for one message type.
///
/// Application codecs report failures as [`CodecError`](crate::CodecError)
/// converted into [`CallError`]; encryption wrappers implement the same trait
/// around them.
pub trait Codec<T>: Send + Sync {
    /// Serialize `item` to its wire form.
    fn encode(&self, item: &T) -> Result<Bytes, CallError>;

    /// Parse a wire message.
    fn decode(&self, wire: Bytes) -> Result<T, CallError>;
}

/// Codec for messages that are already bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec<Bytes> for BytesCodec {
    fn encode(&self, item: &Bytes) -> Result<Bytes, CallError> {
        Ok(item.clone())
    }

    fn decode(&self, wire: Bytes) -> Result<Bytes, CallError> {
        Ok(wire)
    }
}
