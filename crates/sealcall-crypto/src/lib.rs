//! sealcall AEAD adapter
//!
//! Stateless functions that seal and open whole RPC messages with
//! `XChaCha20-Poly1305`. Everything above this crate treats the output as an
//! opaque byte sequence.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────┬──────────────────────────┬──────────────┐
//! │ nonce (24 B) │ ciphertext (len = plain) │ tag (16 B)   │
//! └──────────────┴──────────────────────────┴──────────────┘
//! ```
//!
//! No associated data is bound, and there is no framing beyond what the
//! primitive needs.
//!
//! # Security
//!
//! Authenticity:
//! - Wrong key, any flipped bit, or truncation -> `AeadError::Authentication`
//! - Decryption never returns partially verified plaintext
//!
//! Nonces:
//! - 192-bit random nonces from the OS RNG; collisions are negligible even
//!   for long-lived keys shared by many calls
//!
//! Memory:
//! - Every message is buffered in full before sealing or opening. The async
//!   adapters stop at [`MAX_MESSAGE_SIZE`]
//! - Key material is zeroized when the last handle drops

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod error;
pub mod key;
pub mod stream;

pub use aead::{
    CIPHERTEXT_OVERHEAD, NONCE_SIZE, TAG_SIZE, decrypt_buf, decrypt_bytes, encrypt_buf,
    encrypt_bytes, encrypt_bytes_with_nonce,
};
pub use error::AeadError;
pub use key::{AeadKey, KEY_SIZE};
pub use stream::{MAX_MESSAGE_SIZE, decrypt_stream, encrypt_stream};
