//! Encrypting and decrypting codec wrappers.
//!
//! Wrappers compose around a codec rather than replacing it, so they work for
//! any message type: the inner codec turns a value into plaintext bytes and
//! the wrapper seals those bytes (or opens them before the inner codec
//! parses).
//!
//! ```text
//! caller                                   receiver
//! ──────                                   ────────
//! inner.encode ─▶ RequestEncryptor ══wire══▶ RequestDecryptor ─▶ handler
//! inner.decode ◀─ ResponseDecryptor ◀═wire══ ResponseEncryptor ◀─ handler
//! ```
//!
//! Caller-side wrappers hold their keys directly. Receiver-side wrappers
//! resolve a key per call from the [`KeyDirectory`] using the identity in
//! the call's [`CallContext`].

mod caller;
mod receiver;

use std::sync::Arc;

use bytes::Bytes;
pub use caller::{RequestEncryptor, ResponseDecryptor};
pub use receiver::{RequestDecryptor, ResponseEncryptor};
use sealcall_crypto::AeadKey;

use crate::{
    config::UnknownIdentityPolicy,
    directory::KeyDirectory,
    error::{CallError, Direction},
    identity::CallContext,
};

/// Byte-level codec that needs the current call's context.
///
/// Receiver-side wrappers implement this: they see plaintext serialized by
/// the application on one side and wire bytes on the other.
pub trait ContextCodec: Send + Sync {
    /// Transform an outgoing message.
    fn encode(&self, ctx: &CallContext, message: Bytes) -> Result<Bytes, CallError>;

    /// Transform an incoming message.
    fn decode(&self, ctx: &CallContext, wire: Bytes) -> Result<Bytes, CallError>;
}

/// Find the key for this call's identity in one direction.
///
/// Returns `Ok(None)` when the policy says to pass bytes through unmodified.
fn resolve_key<'a>(
    directory: &'a KeyDirectory,
    ctx: &CallContext,
    direction: Direction,
    policy: UnknownIdentityPolicy,
) -> Result<Option<&'a Arc<AeadKey>>, CallError> {
    let identity = ctx.identity();
    let key = identity.and_then(|identity| match direction {
        Direction::Request => directory.request_key(identity),
        Direction::Response => directory.response_key(identity),
    });

    if key.is_some() {
        return Ok(key);
    }

    match (policy, identity) {
        (UnknownIdentityPolicy::Reject, _) => {
            tracing::warn!(
                %direction,
                identity = identity.map(|id| id.as_str()),
                "rejecting call: no key for caller"
            );
            Err(CallError::UnknownIdentity { direction, identity: identity.cloned() })
        },
        (UnknownIdentityPolicy::Passthrough, None) => {
            tracing::warn!(
                %direction,
                "no caller identity on side channel, passing {direction} through unencrypted"
            );
            Ok(None)
        },
        (UnknownIdentityPolicy::Passthrough, Some(identity)) => {
            tracing::warn!(
                %direction,
                identity = identity.as_str(),
                "caller identity has no key, passing {direction} through unencrypted"
            );
            Ok(None)
        },
    }
}
