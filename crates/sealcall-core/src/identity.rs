//! Caller identity and the side channel that carries it.
//!
//! The caller names itself in the [`IDENTITY_HEADER`] metadata field. The
//! receiver reads that field once, when the call is intercepted, into a
//! [`CallContext`] owned by that call. Codec wrappers further down the call
//! receive the context by reference; nothing is stored globally.

use std::{borrow::Borrow, fmt, sync::Arc};

use thiserror::Error;

use crate::metadata::Metadata;

/// Metadata field carrying the caller identity.
pub const IDENTITY_HEADER: &str = "sealcall-client-id";

/// Errors from constructing a [`CallerIdentity`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Identity token was empty
    #[error("caller identity must not be empty")]
    Empty,

    /// Identity token contained whitespace, control, or non-ASCII characters
    #[error("caller identity must be visible ASCII: {0:?}")]
    InvalidCharacters(String),
}

/// Opaque token naming the calling party.
///
/// Equality is exact string match. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerIdentity(Arc<str>);

impl CallerIdentity {
    /// Validate and wrap an identity token.
    pub fn new(token: impl AsRef<str>) -> Result<Self, IdentityError> {
        let token = token.as_ref();
        if token.is_empty() {
            return Err(IdentityError::Empty);
        }
        if !token.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(IdentityError::InvalidCharacters(token.to_string()));
        }
        Ok(Self(Arc::from(token)))
    }

    /// The token as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CallerIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallerIdentity({:?})", self.as_str())
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CallerIdentity {
    type Error = IdentityError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        Self::new(token)
    }
}

/// Per-call slot holding the identity read from the side channel.
///
/// Written once at interception, read by every codec step of the same call,
/// dropped when the call completes. Not `Clone`: a context
/// belongs to exactly one call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CallContext {
    identity: Option<CallerIdentity>,
}

impl CallContext {
    /// Context for a call that presented `identity`.
    pub fn with_identity(identity: CallerIdentity) -> Self {
        Self { identity: Some(identity) }
    }

    /// Context for a call that presented no identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Read the identity header from incoming metadata.
    ///
    /// A missing, empty, or malformed header yields an anonymous context,
    /// which the key-miss policy then handles.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let Some(raw) = metadata.get(IDENTITY_HEADER) else {
            return Self::anonymous();
        };

        match CallerIdentity::new(raw) {
            Ok(identity) => Self::with_identity(identity),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed caller identity header");
                Self::anonymous()
            },
        }
    }

    /// Identity presented by the caller, if any.
    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.identity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_equality_is_exact() {
        let a = CallerIdentity::new("CLIENT_ID_A").unwrap();

        assert_eq!(a, CallerIdentity::new("CLIENT_ID_A").unwrap());
        assert_ne!(a, CallerIdentity::new("client_id_a").unwrap());
        assert_eq!(a.as_str(), "CLIENT_ID_A");
        assert_eq!(a.to_string(), "CLIENT_ID_A");
    }

    #[test]
    fn identity_rejects_empty_and_non_ascii() {
        assert_eq!(CallerIdentity::new(""), Err(IdentityError::Empty));
        assert!(matches!(CallerIdentity::new("a b"), Err(IdentityError::InvalidCharacters(_))));
        assert!(CallerIdentity::try_from("ünïcode").is_err());
    }

    #[test]
    fn context_reads_identity_header() {
        let mut metadata = Metadata::new();
        metadata.insert(IDENTITY_HEADER, "A").unwrap();

        let ctx = CallContext::from_metadata(&metadata);

        assert_eq!(ctx.identity().map(CallerIdentity::as_str), Some("A"));
    }

    #[test]
    fn missing_header_is_anonymous() {
        let ctx = CallContext::from_metadata(&Metadata::new());

        assert_eq!(ctx, CallContext::anonymous());
        assert!(ctx.identity().is_none());
    }

    #[test]
    fn empty_header_is_anonymous() {
        let mut metadata = Metadata::new();
        metadata.insert(IDENTITY_HEADER, "").unwrap();

        assert!(CallContext::from_metadata(&metadata).identity().is_none());
    }

    #[test]
    fn malformed_header_is_anonymous() {
        let mut metadata = Metadata::new();
        metadata.insert(IDENTITY_HEADER, "two words").unwrap();

        assert!(CallContext::from_metadata(&metadata).identity().is_none());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut metadata = Metadata::new();
        metadata.insert("SealCall-Client-Id", "C").unwrap();

        assert_eq!(
            CallContext::from_metadata(&metadata).identity(),
            Some(&CallerIdentity::new("C").unwrap())
        );
    }
}
