//! Caller-side wrappers: seal requests, open responses.

use std::sync::Arc;

use bytes::Bytes;
use sealcall_crypto::{AeadKey, decrypt_bytes, encrypt_bytes};

use crate::{codec::Codec, error::CallError};

/// Seals every request the inner codec serializes.
///
/// `decode` is untouched; the caller never parses its own requests.
pub struct RequestEncryptor<T> {
    inner: Arc<dyn Codec<T>>,
    key: Arc<AeadKey>,
}

impl<T> RequestEncryptor<T> {
    /// Wrap `inner`, sealing with `key`.
    pub fn new(inner: Arc<dyn Codec<T>>, key: Arc<AeadKey>) -> Self {
        Self { inner, key }
    }
}

impl<T> Codec<T> for RequestEncryptor<T> {
    fn encode(&self, item: &T) -> Result<Bytes, CallError> {
        let plaintext = self.inner.encode(item)?;
        Ok(encrypt_bytes(&plaintext, &self.key)?)
    }

    fn decode(&self, wire: Bytes) -> Result<T, CallError> {
        self.inner.decode(wire)
    }
}

/// Opens every response before the inner codec parses it.
///
/// `encode` is untouched.
pub struct ResponseDecryptor<T> {
    inner: Arc<dyn Codec<T>>,
    key: Arc<AeadKey>,
}

impl<T> ResponseDecryptor<T> {
    /// Wrap `inner`, opening with `key`.
    pub fn new(inner: Arc<dyn Codec<T>>, key: Arc<AeadKey>) -> Self {
        Self { inner, key }
    }
}

impl<T> Codec<T> for ResponseDecryptor<T> {
    fn encode(&self, item: &T) -> Result<Bytes, CallError> {
        self.inner.encode(item)
    }

    fn decode(&self, wire: Bytes) -> Result<T, CallError> {
        let plaintext = decrypt_bytes(&wire, &self.key)?;
        self.inner.decode(plaintext)
    }
}
