//! Receiver-side call decorator.
//!
//! Wraps an application [`Service`] so that requests are opened before the
//! handler sees them and responses are sealed after it returns.
//!
//! # Call Flow
//!
//! ```text
//! ┌────────────────┐ extract identity ┌───────────────┐ open  ┌────────┐
//! │ HeaderReceived │─────────────────>│ DecodeRequest │──────>│ Handle │
//! └────────────────┘                  └───────────────┘       └────────┘
//!                                            │ auth failure /     │
//!                                            │ rejected identity  │ seal
//!                                            ↓                    ↓
//!                                       ┌────────┐       ┌────────────────┐
//!                                       │ Failed │       │ EncodeResponse │──> Done
//!                                       └────────┘       └────────────────┘
//! ```
//!
//! A failure in `DecodeRequest` ends the call before the handler runs: the
//! handler never sees bytes that failed authentication. The caller's key is
//! resolved there even for a call with no request messages.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tracing::Instrument;

use crate::{
    config::{ReceiverConfig, UnknownIdentityPolicy},
    directory::KeyDirectory,
    error::CallError,
    identity::CallContext,
    rpc::{Request, Response, Service, Status},
    seal::{RequestDecryptor, ResponseEncryptor},
};

/// Stage of an inbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverPhase {
    /// Metadata arrived; identity not yet extracted
    HeaderReceived,
    /// Opening request messages
    DecodeRequest,
    /// Application handler running
    Handle,
    /// Sealing response messages
    EncodeResponse,
    /// Call completed successfully
    Done,
}

impl fmt::Display for ReceiverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HeaderReceived => "header_received",
            Self::DecodeRequest => "decode_request",
            Self::Handle => "handle",
            Self::EncodeResponse => "encode_response",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Service decorator applying per-caller message encryption.
pub struct SealedService<S> {
    inner: S,
    request: RequestDecryptor,
    response: ResponseEncryptor,
    config: ReceiverConfig,
}

impl<S> SealedService<S>
where
    S: Service,
{
    /// Wrap `inner`, resolving keys from `directory`.
    pub fn new(inner: S, directory: Arc<KeyDirectory>, config: ReceiverConfig) -> Self {
        let policy = config.on_unknown_identity;
        if policy == UnknownIdentityPolicy::Passthrough {
            tracing::warn!(
                "receiver configured to pass unrecognised callers through unencrypted"
            );
        }

        Self {
            inner,
            request: RequestDecryptor::new(Arc::clone(&directory), policy),
            response: ResponseEncryptor::new(directory, policy),
            config,
        }
    }

    /// Wrapped application service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Active configuration.
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    async fn process(&self, ctx: &CallContext, request: Request) -> Result<Response, CallError> {
        let Request { method, metadata, messages } = request;

        tracing::debug!(phase = %ReceiverPhase::DecodeRequest, count = messages.len());
        let plaintexts = self.request.open_all(ctx, messages).inspect_err(|err| {
            tracing::warn!(phase = %ReceiverPhase::DecodeRequest, error = %err, "request rejected");
        })?;

        tracing::debug!(phase = %ReceiverPhase::Handle);
        let response = self.inner.call(Request { method, metadata, messages: plaintexts }).await?;

        tracing::debug!(phase = %ReceiverPhase::EncodeResponse, count = response.messages.len());
        let sealed = self.response.seal_all(ctx, response.messages)?;

        tracing::debug!(phase = %ReceiverPhase::Done);
        Ok(Response::new(sealed))
    }
}

#[async_trait]
impl<S> Service for SealedService<S>
where
    S: Service,
{
    async fn call(&self, request: Request) -> Result<Response, Status> {
        let ctx = CallContext::from_metadata(&request.metadata);
        let span = tracing::debug_span!(
            "sealed_call",
            method = %request.method,
            identity = tracing::field::Empty,
        );
        if let Some(identity) = ctx.identity() {
            span.record("identity", identity.as_str());
        }
        span.in_scope(|| {
            tracing::debug!(phase = %ReceiverPhase::HeaderReceived, "identity extracted");
        });

        self.process(&ctx, request)
            .instrument(span)
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, "call failed");
                err.to_status()
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use sealcall_crypto::{AeadKey, KEY_SIZE, decrypt_bytes, encrypt_bytes};

    use super::*;
    use crate::{
        directory::KeyDirectoryEntry,
        identity::{CallerIdentity, IDENTITY_HEADER},
        metadata::Metadata,
        rpc::Code,
    };

    /// Prefixes each message with "echo:" and counts invocations.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Service for Echo {
        async fn call(&self, request: Request) -> Result<Response, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let messages = request
                .messages
                .into_iter()
                .map(|m| Bytes::from([b"echo:".as_slice(), &m[..]].concat()))
                .collect();
            Ok(Response::new(messages))
        }
    }

    fn key() -> Arc<AeadKey> {
        Arc::new(AeadKey::from_bytes([0x42; KEY_SIZE]))
    }

    fn sealed(key: &Arc<AeadKey>, config: ReceiverConfig) -> SealedService<Echo> {
        let directory = KeyDirectory::from_entries([(
            CallerIdentity::new("A").unwrap(),
            KeyDirectoryEntry::symmetric(Arc::clone(key)),
        )]);
        SealedService::new(Echo::default(), Arc::new(directory), config)
    }

    fn request_from(identity: Option<&str>, messages: Vec<Bytes>) -> Request {
        let mut metadata = Metadata::new();
        if let Some(identity) = identity {
            metadata.insert(IDENTITY_HEADER, identity).unwrap();
        }
        Request { method: "svc/Echo".to_string(), metadata, messages }
    }

    #[tokio::test]
    async fn opens_request_and_seals_response() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::reject_unknown());
        let wire = encrypt_bytes(b"hello", &key).unwrap();

        let response = service.call(request_from(Some("A"), vec![wire])).await.unwrap();

        assert_eq!(response.messages.len(), 1);
        assert_eq!(decrypt_bytes(&response.messages[0], &key).unwrap().as_ref(), b"echo:hello");
    }

    #[tokio::test]
    async fn every_message_in_a_stream_is_sealed_separately() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::reject_unknown());
        let messages = ["one", "two", "three"]
            .iter()
            .map(|m| encrypt_bytes(m.as_bytes(), &key).unwrap())
            .collect();

        let response = service.call(request_from(Some("A"), messages)).await.unwrap();

        let opened: Vec<_> =
            response.messages.iter().map(|m| decrypt_bytes(m, &key).unwrap()).collect();
        assert_eq!(opened, vec!["echo:one", "echo:two", "echo:three"]);
        assert_eq!(service.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tampered_request_never_reaches_handler() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::reject_unknown());
        let mut wire = encrypt_bytes(b"hello", &key).unwrap().to_vec();
        wire[30] ^= 0x04;

        let status =
            service.call(request_from(Some("A"), vec![Bytes::from(wire)])).await.unwrap_err();

        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(service.inner().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_bad_message_fails_the_whole_call() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::reject_unknown());
        let good = encrypt_bytes(b"good", &key).unwrap();
        let bad = Bytes::from_static(b"plaintext sneaking in alongside");

        let status = service.call(request_from(Some("A"), vec![good, bad])).await.unwrap_err();

        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(service.inner().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reject_policy_blocks_anonymous_caller() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::reject_unknown());

        let status = service
            .call(request_from(None, vec![Bytes::from_static(b"hello")]))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(service.inner().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn passthrough_policy_serves_anonymous_caller_in_plaintext() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::passthrough_unknown());

        let response = service
            .call(request_from(None, vec![Bytes::from_static(b"hello")]))
            .await
            .unwrap();

        assert_eq!(response.messages, vec![Bytes::from_static(b"echo:hello")]);
        assert_eq!(service.config().on_unknown_identity, UnknownIdentityPolicy::Passthrough);
    }

    #[tokio::test]
    async fn reject_policy_blocks_callers_without_messages() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::reject_unknown());

        for identity in [Some("UNKNOWN_CLIENT"), None] {
            let status = service.call(request_from(identity, Vec::new())).await.unwrap_err();
            assert_eq!(status.code(), Code::Unauthenticated);
        }
        assert_eq!(service.inner().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn known_caller_without_messages_reaches_handler() {
        let key = key();
        let service = sealed(&key, ReceiverConfig::reject_unknown());

        let response = service.call(request_from(Some("A"), Vec::new())).await.unwrap();

        assert!(response.messages.is_empty());
        assert_eq!(service.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn phase_names() {
        assert_eq!(ReceiverPhase::HeaderReceived.to_string(), "header_received");
        assert_eq!(ReceiverPhase::EncodeResponse.to_string(), "encode_response");
    }
}
