//! Identities and keys shared by the integration tests.
//!
//! Two provisioned callers:
//! - `A` with distinct request and response keys
//! - `C` with one key for both directions
//!
//! plus an identity the receiver has never heard of.

use std::sync::Arc;

use sealcall_core::{
    CallerEncryptor, CallerIdentity, KeyDirectory, KeyDirectoryEntry, ReceiverConfig,
    SealedService, Service,
};
use sealcall_crypto::AeadKey;

use crate::{
    echo::EchoService,
    loopback::{LoopbackChannel, WireTap},
};

/// Caller with separate request and response keys.
pub const CLIENT_A: &str = "CLIENT_ID_A";
/// Caller sharing one key across both directions.
pub const CLIENT_C: &str = "CLIENT_ID_C";
/// Identity missing from the directory.
pub const UNKNOWN_CLIENT: &str = "UNKNOWN_CLIENT";

/// Fresh key from the OS RNG.
pub fn random_key() -> Arc<AeadKey> {
    Arc::new(AeadKey::from_bytes(rand::random()))
}

fn identity(token: &str) -> CallerIdentity {
    match CallerIdentity::new(token) {
        Ok(identity) => identity,
        // Fixture tokens are constants checked by the tests below
        Err(err) => unreachable!("fixture identity {token:?} is invalid: {err}"),
    }
}

/// Key material for one test run.
pub struct Fixture {
    /// Seals requests from `A`
    pub a_request: Arc<AeadKey>,
    /// Seals responses to `A`
    pub a_response: Arc<AeadKey>,
    /// Seals both directions for `C`
    pub c_shared: Arc<AeadKey>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Generate fresh keys.
    pub fn new() -> Self {
        Self { a_request: random_key(), a_response: random_key(), c_shared: random_key() }
    }

    /// Receiver directory provisioning `A` and `C`.
    pub fn directory(&self) -> Arc<KeyDirectory> {
        Arc::new(KeyDirectory::from_entries([
            (
                identity(CLIENT_A),
                KeyDirectoryEntry::new(Arc::clone(&self.a_request), Arc::clone(&self.a_response)),
            ),
            (identity(CLIENT_C), KeyDirectoryEntry::symmetric(Arc::clone(&self.c_shared))),
        ]))
    }

    /// Start an echo receiver behind the sealing decorator.
    ///
    /// Returns the bare echo service (for its counters) and a channel to the
    /// decorated one. Every body on the channel is recorded in `tap`.
    pub fn serve(&self, config: ReceiverConfig, tap: WireTap) -> (Arc<EchoService>, LoopbackChannel) {
        let echo = Arc::new(EchoService::new());
        let sealed: Arc<dyn Service> =
            Arc::new(SealedService::new(Arc::clone(&echo), self.directory(), config));
        (echo, LoopbackChannel::tapped(sealed, tap))
    }

    /// Interceptor for `A`.
    pub fn caller_a(&self) -> CallerEncryptor {
        CallerEncryptor::new(
            Arc::clone(&self.a_request),
            Arc::clone(&self.a_response),
            identity(CLIENT_A),
        )
    }

    /// Interceptor for `C`.
    pub fn caller_c(&self) -> CallerEncryptor {
        CallerEncryptor::symmetric(Arc::clone(&self.c_shared), identity(CLIENT_C))
    }

    /// `A`'s keys presented under `C`'s identity.
    pub fn caller_mismatched(&self) -> CallerEncryptor {
        CallerEncryptor::new(
            Arc::clone(&self.a_request),
            Arc::clone(&self.a_response),
            identity(CLIENT_C),
        )
    }

    /// `A`'s keys presented under an identity the receiver does not know.
    pub fn caller_unknown(&self) -> CallerEncryptor {
        CallerEncryptor::new(
            Arc::clone(&self.a_request),
            Arc::clone(&self.a_response),
            identity(UNKNOWN_CLIENT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_identities_are_valid() {
        for token in [CLIENT_A, CLIENT_C, UNKNOWN_CLIENT] {
            assert!(CallerIdentity::new(token).is_ok());
        }
    }

    #[test]
    fn directory_provisions_known_callers_only() {
        let directory = Fixture::new().directory();

        assert!(directory.contains(&identity(CLIENT_A)));
        assert!(directory.contains(&identity(CLIENT_C)));
        assert!(!directory.contains(&identity(UNKNOWN_CLIENT)));
        assert_eq!(directory.len(), 2);
    }
}
