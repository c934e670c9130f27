//! Caller-side call decorator.
//!
//! Installs the sealing codecs on every outgoing call and names the caller
//! in the side channel.
//!
//! # Call Flow
//!
//! ```text
//! ┌──────┐ inject identity ┌──────┐ seal requests ┌─────────┐ open responses ┌──────┐
//! │ Init │────────────────>│ Send │──────────────>│ Receive │───────────────>│ Done │
//! └──────┘ (if absent)     └──────┘               └─────────┘                └──────┘
//! ```
//!
//! The caller does not branch on identity validity; it is assumed to know
//! its own identity and keys.

use std::sync::Arc;

use sealcall_crypto::AeadKey;

use crate::{
    error::CallError,
    identity::{CallerIdentity, IDENTITY_HEADER},
    metadata::Metadata,
    rpc::{ClientInterceptor, MethodDescriptor},
    seal::{RequestEncryptor, ResponseDecryptor},
};

/// Client interceptor that encrypts requests and decrypts responses.
#[derive(Debug, Clone)]
pub struct CallerEncryptor {
    /// Seals outgoing requests
    request_key: Arc<AeadKey>,
    /// Opens incoming responses
    response_key: Arc<AeadKey>,
    /// Tells the receiver which keys to use
    identity: CallerIdentity,
}

impl CallerEncryptor {
    /// Interceptor with distinct keys per direction.
    pub fn new(
        request_key: Arc<AeadKey>,
        response_key: Arc<AeadKey>,
        identity: CallerIdentity,
    ) -> Self {
        Self { request_key, response_key, identity }
    }

    /// Interceptor using one shared key for both directions.
    pub fn symmetric(key: Arc<AeadKey>, identity: CallerIdentity) -> Self {
        Self::new(Arc::clone(&key), key, identity)
    }

    /// Identity injected into outgoing calls.
    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }
}

impl ClientInterceptor for CallerEncryptor {
    fn intercept_method<Req, Resp>(
        &self,
        method: &MethodDescriptor<Req, Resp>,
    ) -> MethodDescriptor<Req, Resp>
    where
        Req: 'static,
        Resp: 'static,
    {
        let request_codec =
            RequestEncryptor::new(Arc::clone(method.request_codec()), Arc::clone(&self.request_key));
        let response_codec = ResponseDecryptor::new(
            Arc::clone(method.response_codec()),
            Arc::clone(&self.response_key),
        );

        method.with_codecs(Arc::new(request_codec), Arc::new(response_codec))
    }

    fn start(&self, metadata: &mut Metadata) -> Result<(), CallError> {
        if !metadata.insert_if_absent(IDENTITY_HEADER, self.identity.as_str())? {
            tracing::debug!(
                identity = self.identity.as_str(),
                existing = metadata.get(IDENTITY_HEADER),
                "identity header already set, leaving it in place"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use sealcall_crypto::{KEY_SIZE, decrypt_bytes, encrypt_bytes};

    use super::*;
    use crate::codec::BytesCodec;

    fn encryptor() -> (CallerEncryptor, Arc<AeadKey>, Arc<AeadKey>) {
        let request_key = Arc::new(AeadKey::from_bytes([0x01; KEY_SIZE]));
        let response_key = Arc::new(AeadKey::from_bytes([0x02; KEY_SIZE]));
        let encryptor = CallerEncryptor::new(
            Arc::clone(&request_key),
            Arc::clone(&response_key),
            CallerIdentity::new("A").unwrap(),
        );
        (encryptor, request_key, response_key)
    }

    #[test]
    fn start_injects_identity_when_absent() {
        let (encryptor, ..) = encryptor();
        let mut metadata = Metadata::new();

        encryptor.start(&mut metadata).unwrap();

        assert_eq!(metadata.get(IDENTITY_HEADER), Some("A"));
    }

    #[test]
    fn start_never_overwrites_existing_identity() {
        let (encryptor, ..) = encryptor();
        let mut metadata = Metadata::new();
        metadata.insert(IDENTITY_HEADER, "OVERRIDE").unwrap();

        encryptor.start(&mut metadata).unwrap();
        encryptor.start(&mut metadata).unwrap();

        assert_eq!(metadata.get(IDENTITY_HEADER), Some("OVERRIDE"));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn intercepted_method_seals_and_opens() {
        let (encryptor, request_key, response_key) = encryptor();
        let method: MethodDescriptor<Bytes, Bytes> =
            MethodDescriptor::new("svc/Hello", Arc::new(BytesCodec), Arc::new(BytesCodec));

        let sealed = encryptor.intercept_method(&method);

        let wire = sealed.request_codec().encode(&Bytes::from_static(b"hello")).unwrap();
        assert_eq!(decrypt_bytes(&wire, &request_key).unwrap().as_ref(), b"hello");

        let reply = encrypt_bytes(b"echo:hello", &response_key).unwrap();
        assert_eq!(sealed.response_codec().decode(reply).unwrap().as_ref(), b"echo:hello");

        assert_eq!(sealed.name(), "svc/Hello");
    }

    #[test]
    fn symmetric_uses_one_key_both_ways() {
        let key = Arc::new(AeadKey::from_bytes([0x0C; KEY_SIZE]));
        let encryptor = CallerEncryptor::symmetric(Arc::clone(&key), CallerIdentity::new("C").unwrap());
        let method: MethodDescriptor<Bytes, Bytes> =
            MethodDescriptor::new("svc/Hello", Arc::new(BytesCodec), Arc::new(BytesCodec));
        let sealed = encryptor.intercept_method(&method);

        let wire = sealed.request_codec().encode(&Bytes::from_static(b"ping")).unwrap();
        let opened = sealed.response_codec().decode(wire).unwrap();

        assert_eq!(opened.as_ref(), b"ping");
        assert_eq!(encryptor.identity().as_str(), "C");
    }
}
