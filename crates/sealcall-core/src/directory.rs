//! Receiver-side key directory.
//!
//! Maps each caller identity to the key that opens its requests and the key
//! that seals responses back to it. Built once before the endpoint accepts
//! calls and never mutated afterwards, so concurrent calls read it through an
//! `Arc` without locking. Rotating keys means building a new directory.

use std::{collections::HashMap, sync::Arc};

use sealcall_crypto::AeadKey;

use crate::identity::CallerIdentity;

/// Key pair for one caller.
#[derive(Debug, Clone)]
pub struct KeyDirectoryEntry {
    /// Opens requests from the caller
    pub request_key: Arc<AeadKey>,
    /// Seals responses to the caller
    pub response_key: Arc<AeadKey>,
}

impl KeyDirectoryEntry {
    /// Entry with distinct keys per direction.
    pub fn new(request_key: Arc<AeadKey>, response_key: Arc<AeadKey>) -> Self {
        Self { request_key, response_key }
    }

    /// Entry using one shared key for both directions.
    pub fn symmetric(key: Arc<AeadKey>) -> Self {
        Self { request_key: Arc::clone(&key), response_key: key }
    }
}

/// Immutable identity → key mapping, one table per direction.
///
/// The two tables are independent: an identity may have a request key
/// without a response key and vice versa.
#[derive(Debug, Clone, Default)]
pub struct KeyDirectory {
    /// Identity → request decryption key
    request_keys: HashMap<CallerIdentity, Arc<AeadKey>>,
    /// Identity → response encryption key
    response_keys: HashMap<CallerIdentity, Arc<AeadKey>>,
}

impl KeyDirectory {
    /// Build from separate request and response tables.
    pub fn new(
        request_keys: HashMap<CallerIdentity, Arc<AeadKey>>,
        response_keys: HashMap<CallerIdentity, Arc<AeadKey>>,
    ) -> Self {
        Self { request_keys, response_keys }
    }

    /// Build from complete per-caller entries.
    ///
    /// A later entry for the same identity replaces an earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = (CallerIdentity, KeyDirectoryEntry)>) -> Self {
        let mut request_keys = HashMap::new();
        let mut response_keys = HashMap::new();

        for (identity, entry) in entries {
            request_keys.insert(identity.clone(), entry.request_key);
            response_keys.insert(identity, entry.response_key);
        }

        Self { request_keys, response_keys }
    }

    /// Key that opens requests from `identity`.
    pub fn request_key(&self, identity: &CallerIdentity) -> Option<&Arc<AeadKey>> {
        self.request_keys.get(identity)
    }

    /// Key that seals responses to `identity`.
    pub fn response_key(&self, identity: &CallerIdentity) -> Option<&Arc<AeadKey>> {
        self.response_keys.get(identity)
    }

    /// Both keys for `identity`, or `None` if either direction is missing.
    pub fn entry(&self, identity: &CallerIdentity) -> Option<KeyDirectoryEntry> {
        let request_key = self.request_keys.get(identity)?;
        let response_key = self.response_keys.get(identity)?;
        Some(KeyDirectoryEntry::new(Arc::clone(request_key), Arc::clone(response_key)))
    }

    /// Whether `identity` has a key in either direction.
    pub fn contains(&self, identity: &CallerIdentity) -> bool {
        self.request_keys.contains_key(identity) || self.response_keys.contains_key(identity)
    }

    /// Identities known in either direction, sorted.
    pub fn identities(&self) -> Vec<&CallerIdentity> {
        let mut identities: Vec<_> =
            self.request_keys.keys().chain(self.response_keys.keys()).collect();
        identities.sort();
        identities.dedup();
        identities
    }

    /// Number of distinct identities.
    pub fn len(&self) -> usize {
        let response_only =
            self.response_keys.keys().filter(|id| !self.request_keys.contains_key(*id)).count();
        self.request_keys.len() + response_only
    }

    /// Whether the directory has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.request_keys.is_empty() && self.response_keys.is_empty()
    }
}
