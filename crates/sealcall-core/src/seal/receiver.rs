//! Receiver-side wrappers: open requests, seal responses.
//!
//! Both work on raw bytes ahead of the application's own deserializer and
//! pick their key per call from the directory.

use std::sync::Arc;

use bytes::Bytes;
use sealcall_crypto::{decrypt_bytes, encrypt_bytes};

use super::{ContextCodec, resolve_key};
use crate::{
    config::UnknownIdentityPolicy,
    directory::KeyDirectory,
    error::{CallError, Direction},
    identity::CallContext,
};

/// Opens incoming requests with the caller's request key.
#[derive(Debug, Clone)]
pub struct RequestDecryptor {
    directory: Arc<KeyDirectory>,
    policy: UnknownIdentityPolicy,
}

impl RequestDecryptor {
    /// Decryptor consulting `directory`, applying `policy` on a miss.
    pub fn new(directory: Arc<KeyDirectory>, policy: UnknownIdentityPolicy) -> Self {
        Self { directory, policy }
    }

    /// Open every request message of one call.
    ///
    /// The caller's key is resolved once, before any message is touched, so
    /// a rejected identity fails the call even when it carries no messages.
    pub fn open_all(&self, ctx: &CallContext, messages: Vec<Bytes>) -> Result<Vec<Bytes>, CallError> {
        match resolve_key(&self.directory, ctx, Direction::Request, self.policy)? {
            Some(key) => messages
                .iter()
                .map(|wire| decrypt_bytes(wire, key).map_err(CallError::from))
                .collect(),
            None => Ok(messages),
        }
    }
}

impl ContextCodec for RequestDecryptor {
    fn encode(&self, _ctx: &CallContext, message: Bytes) -> Result<Bytes, CallError> {
        Ok(message)
    }

    fn decode(&self, ctx: &CallContext, wire: Bytes) -> Result<Bytes, CallError> {
        match resolve_key(&self.directory, ctx, Direction::Request, self.policy)? {
            Some(key) => Ok(decrypt_bytes(&wire, key)?),
            None => Ok(wire),
        }
    }
}

/// Seals outgoing responses with the caller's response key.
#[derive(Debug, Clone)]
pub struct ResponseEncryptor {
    directory: Arc<KeyDirectory>,
    policy: UnknownIdentityPolicy,
}

impl ResponseEncryptor {
    /// Encryptor consulting `directory`, applying `policy` on a miss.
    pub fn new(directory: Arc<KeyDirectory>, policy: UnknownIdentityPolicy) -> Self {
        Self { directory, policy }
    }

    /// Seal every response message of one call with a single key lookup.
    pub fn seal_all(&self, ctx: &CallContext, messages: Vec<Bytes>) -> Result<Vec<Bytes>, CallError> {
        match resolve_key(&self.directory, ctx, Direction::Response, self.policy)? {
            Some(key) => messages
                .iter()
                .map(|message| encrypt_bytes(message, key).map_err(CallError::from))
                .collect(),
            None => Ok(messages),
        }
    }
}

impl ContextCodec for ResponseEncryptor {
    fn encode(&self, ctx: &CallContext, message: Bytes) -> Result<Bytes, CallError> {
        match resolve_key(&self.directory, ctx, Direction::Response, self.policy)? {
            Some(key) => Ok(encrypt_bytes(&message, key)?),
            None => Ok(message),
        }
    }

    fn decode(&self, _ctx: &CallContext, wire: Bytes) -> Result<Bytes, CallError> {
        Ok(wire)
    }
}
