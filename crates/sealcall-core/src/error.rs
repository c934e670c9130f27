//! Error types for the sealcall call layer.
//!
//! Failures stay typed while they travel through a call (`CallError`) and are
//! flattened into a [`Status`] only where they cross the wire back to the
//! caller. Nothing in this layer retries: decryption is deterministic, so an
//! authentication failure will fail again on the same input.

use std::fmt;

use sealcall_crypto::AeadError;
use thiserror::Error;

use crate::{
    identity::CallerIdentity,
    metadata::MetadataError,
    rpc::{Code, Status},
};

/// Message direction within a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Caller to receiver
    Request,
    /// Receiver to caller
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// Failure inside an application serializer.
///
/// Wrappers forward these untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Value could not be serialized
    #[error("encode failed: {0}")]
    Encode(String),

    /// Bytes could not be deserialized
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Errors that end a call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Application serializer failed
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Sealing or opening a message failed (authentication, I/O, size)
    #[error("message protection failed: {0}")]
    Crypto(#[from] AeadError),

    /// No key for the caller's identity and the policy is to reject
    #[error(
        "no {direction} key for caller {}",
        .identity.as_ref().map_or("<anonymous>", CallerIdentity::as_str)
    )]
    UnknownIdentity {
        /// Direction that needed a key
        direction: Direction,
        /// Identity presented by the caller, if any
        identity: Option<CallerIdentity>,
    },

    /// Metadata could not be built
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Remote side ended the call
    #[error("call failed: {0}")]
    Status(Status),

    /// Transport could not deliver the call
    #[error("transport error: {0}")]
    Transport(String),
}

impl CallError {
    /// Returns true if the ciphertext failed authentication.
    pub fn is_authentication(&self) -> bool {
        match self {
            Self::Crypto(err) => err.is_authentication(),
            _ => false,
        }
    }

    /// Returns true if this error may succeed on retry.
    ///
    /// Only delivery failures qualify. Everything this layer raises itself
    /// (authentication, unknown identity, codec) is deterministic.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(status) => status.code() == Code::Unavailable,
            _ => false,
        }
    }

    /// Status reported to the caller for this error.
    pub fn to_status(&self) -> Status {
        match self {
            Self::Crypto(err) if err.is_authentication() => {
                Status::new(Code::Unauthenticated, "message failed authentication")
            },
            Self::Crypto(AeadError::MessageTooLarge { .. }) => {
                Status::new(Code::InvalidArgument, self.to_string())
            },
            Self::Crypto(_) => Status::new(Code::Internal, self.to_string()),
            Self::UnknownIdentity { .. } => Status::new(Code::Unauthenticated, self.to_string()),
            Self::Codec(CodecError::Decode(_)) | Self::Metadata(_) => {
                Status::new(Code::InvalidArgument, self.to_string())
            },
            Self::Codec(CodecError::Encode(_)) => Status::new(Code::Internal, self.to_string()),
            Self::Status(status) => status.clone(),
            Self::Transport(_) => Status::new(Code::Unavailable, self.to_string()),
        }
    }
}

impl From<Status> for CallError {
    fn from(status: Status) -> Self {
        Self::Status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_map_to_unauthenticated() {
        let err = CallError::from(AeadError::Authentication { reason: "tag mismatch" });

        assert!(err.is_authentication());
        assert!(!err.is_transient());
        assert_eq!(err.to_status().code(), Code::Unauthenticated);
        // Status must not echo crypto internals back to the caller
        assert!(!err.to_status().message().contains("tag"));
    }

    #[test]
    fn unknown_identity_names_direction_and_caller() {
        let err = CallError::UnknownIdentity {
            direction: Direction::Request,
            identity: Some(CallerIdentity::new("UNKNOWN_CLIENT").unwrap()),
        };

        assert_eq!(err.to_string(), "no request key for caller UNKNOWN_CLIENT");
        assert_eq!(err.to_status().code(), Code::Unauthenticated);

        let anonymous = CallError::UnknownIdentity { direction: Direction::Response, identity: None };
        assert_eq!(anonymous.to_string(), "no response key for caller <anonymous>");
    }

    #[test]
    fn codec_errors_pass_through_unchanged() {
        let inner = CodecError::Decode("missing field".to_string());
        let err = CallError::from(inner.clone());

        assert_eq!(err, CallError::Codec(inner));
        assert_eq!(err.to_string(), "decode failed: missing field");
        assert_eq!(err.to_status().code(), Code::InvalidArgument);
    }

    #[test]
    fn only_delivery_failures_are_transient() {
        assert!(CallError::Transport("reset".to_string()).is_transient());
        assert!(CallError::Status(Status::new(Code::Unavailable, "down")).is_transient());

        assert!(!CallError::Status(Status::new(Code::Unauthenticated, "no")).is_transient());
        assert!(!CallError::Crypto(AeadError::Encryption).is_transient());
        assert!(
            !CallError::UnknownIdentity { direction: Direction::Request, identity: None }
                .is_transient()
        );
    }

    #[test]
    fn remote_status_is_preserved() {
        let status = Status::new(Code::NotFound, "no such method");

        assert_eq!(CallError::from(status.clone()).to_status(), status);
    }
}
