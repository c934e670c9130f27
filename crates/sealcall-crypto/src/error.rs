//! Error types for the AEAD adapter.

use std::io;

use thiserror::Error;

/// Errors from sealing or opening a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AeadError {
    /// Ciphertext was not produced by this key, or was altered or truncated
    #[error("authentication failed: {reason}")]
    Authentication {
        /// What the adapter observed
        reason: &'static str,
    },

    /// The primitive refused to encrypt the input
    #[error("encryption failed")]
    Encryption,

    /// Input exceeded the buffering limit
    #[error("message too large: {size} bytes exceeds limit of {max} bytes")]
    MessageTooLarge {
        /// Bytes read before giving up
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// Reading the input buffer failed
    #[error("failed to read message: {0}")]
    Io(String),
}

impl AeadError {
    /// Returns true if the ciphertext failed authentication (wrong key or
    /// tampering).
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

impl From<io::Error> for AeadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
