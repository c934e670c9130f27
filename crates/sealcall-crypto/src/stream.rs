//! Async reader adapters.
//!
//! The reader is drained into memory before the cipher runs; there is no
//! incremental AEAD mode. [`MAX_MESSAGE_SIZE`] bounds how much a single
//! message may buffer.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{
    aead::{decrypt_bytes, encrypt_bytes},
    error::AeadError,
    key::AeadKey,
};

/// Maximum bytes buffered for one message (16 MiB).
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Drain `reader` and encrypt its contents.
///
/// # Errors
///
/// - `Io`: the reader failed; the message is abandoned
/// - `MessageTooLarge`: more than [`MAX_MESSAGE_SIZE`] bytes were available
pub async fn encrypt_stream<R>(reader: R, key: &AeadKey) -> Result<Bytes, AeadError>
where
    R: AsyncRead + Unpin,
{
    let plaintext = read_bounded(reader, MAX_MESSAGE_SIZE).await?;
    encrypt_bytes(&plaintext, key)
}

/// Drain `reader` and decrypt its contents.
///
/// # Errors
///
/// - `Io`: the reader failed; the message is abandoned
/// - `MessageTooLarge`: more than [`MAX_MESSAGE_SIZE`] bytes were available
/// - `Authentication`: see [`decrypt_bytes`]
pub async fn decrypt_stream<R>(reader: R, key: &AeadKey) -> Result<Bytes, AeadError>
where
    R: AsyncRead + Unpin,
{
    let ciphertext = read_bounded(reader, MAX_MESSAGE_SIZE).await?;
    decrypt_bytes(&ciphertext, key)
}

async fn read_bounded<R>(reader: R, max: usize) -> Result<Vec<u8>, AeadError>
where
    R: AsyncRead + Unpin,
{
    // Read one byte past the limit so an exactly-full message is accepted.
    let mut limited = reader.take(max as u64 + 1);
    let mut buffer = Vec::new();
    limited.read_to_end(&mut buffer).await?;

    if buffer.len() > max {
        return Err(AeadError::MessageTooLarge { size: buffer.len(), max });
    }

    Ok(buffer)
}
