//! Whole-message encryption using `XChaCha20-Poly1305`.
//!
//! Each message is sealed in one shot. The wire form is
//! `nonce (24) || ciphertext || tag (16)`; nothing else is framed. No
//! associated data is bound.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};

use crate::{error::AeadError, key::AeadKey};

/// Size of the `XChaCha20` nonce prefix (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Bytes added to every sealed message.
pub const CIPHERTEXT_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypt a fully buffered message under a fresh random nonce.
///
/// The nonce comes from the OS RNG, so sealing the same plaintext twice
/// yields different ciphertexts.
pub fn encrypt_bytes(plaintext: &[u8], key: &AeadKey) -> Result<Bytes, AeadError> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    encrypt_bytes_with_nonce(plaintext, key, nonce)
}

/// Encrypt with a caller-provided nonce.
///
/// # Security
///
/// - Caller MUST NOT reuse a nonce under the same key
/// - Intended for deterministic tests and fuzzing; production paths use
///   [`encrypt_bytes`]
pub fn encrypt_bytes_with_nonce(
    plaintext: &[u8],
    key: &AeadKey,
    nonce: [u8; NONCE_SIZE],
) -> Result<Bytes, AeadError> {
    let cipher = XChaCha20Poly1305::new(key.key().into());
    let sealed = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| AeadError::Encryption)?;

    let mut wire = BytesMut::with_capacity(NONCE_SIZE + sealed.len());
    wire.put_slice(&nonce);
    wire.put_slice(&sealed);
    Ok(wire.freeze())
}

/// Decrypt a message produced by [`encrypt_bytes`].
///
/// # Errors
///
/// - `Authentication`: wrong key, modified bytes, or input shorter than
///   nonce + tag
pub fn decrypt_bytes(ciphertext: &[u8], key: &AeadKey) -> Result<Bytes, AeadError> {
    if ciphertext.len() < CIPHERTEXT_OVERHEAD {
        return Err(AeadError::Authentication { reason: "ciphertext truncated" });
    }

    let (nonce, sealed) = ciphertext.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.key().into());

    cipher
        .decrypt(XNonce::from_slice(nonce), sealed)
        .map(Bytes::from)
        .map_err(|_| AeadError::Authentication { reason: "tag mismatch" })
}

/// [`encrypt_bytes`] over any buffer. The buffer is drained.
pub fn encrypt_buf(mut plaintext: impl Buf, key: &AeadKey) -> Result<Bytes, AeadError> {
    let plaintext = plaintext.copy_to_bytes(plaintext.remaining());
    encrypt_bytes(&plaintext, key)
}

/// [`decrypt_bytes`] over any buffer. The buffer is drained.
pub fn decrypt_buf(mut ciphertext: impl Buf, key: &AeadKey) -> Result<Bytes, AeadError> {
    let ciphertext = ciphertext.copy_to_bytes(ciphertext.remaining());
    decrypt_bytes(&ciphertext, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KEY_SIZE;

    fn test_key(fill: u8) -> AeadKey {
        let mut key = [0u8; KEY_SIZE];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_add(fill);
        }
        AeadKey::from_bytes(key)
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key(0);
        let plaintext = b"Hello, World!";

        let sealed = encrypt_bytes(plaintext, &key).unwrap();
        let opened = decrypt_bytes(&sealed, &key).unwrap();

        assert_eq!(opened.as_ref(), plaintext);
    }

    #[test]
    fn encrypt_decrypt_empty_message() {
        let key = test_key(0);

        let sealed = encrypt_bytes(b"", &key).unwrap();
        assert_eq!(sealed.len(), CIPHERTEXT_OVERHEAD);

        let opened = decrypt_bytes(&sealed, &key).unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn encrypt_decrypt_large_message() {
        let key = test_key(7);
        let plaintext = vec![0x42u8; 256 * 1024];

        let sealed = encrypt_bytes(&plaintext, &key).unwrap();
        let opened = decrypt_bytes(&sealed, &key).unwrap();

        assert_eq!(opened.as_ref(), plaintext.as_slice());
    }

    #[test]
    fn ciphertext_carries_nonce_and_tag() {
        let key = test_key(0);
        let plaintext = b"test message";
        let nonce = [0x5A; NONCE_SIZE];

        let sealed = encrypt_bytes_with_nonce(plaintext, &key, nonce).unwrap();

        assert_eq!(sealed.len(), plaintext.len() + CIPHERTEXT_OVERHEAD);
        assert_eq!(&sealed[..NONCE_SIZE], &nonce);
    }

    #[test]
    fn fixed_nonce_is_deterministic() {
        let key = test_key(3);
        let nonce = [0x01; NONCE_SIZE];

        let first = encrypt_bytes_with_nonce(b"same", &key, nonce).unwrap();
        let second = encrypt_bytes_with_nonce(b"same", &key, nonce).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn random_nonces_differ_between_messages() {
        let key = test_key(0);

        let first = encrypt_bytes(b"same", &key).unwrap();
        let second = encrypt_bytes(b"same", &key).unwrap();

        assert_ne!(&first[..NONCE_SIZE], &second[..NONCE_SIZE]);
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let sealed = encrypt_bytes(b"secret message", &test_key(0)).unwrap();

        let result = decrypt_bytes(&sealed, &test_key(1));

        assert!(matches!(
            result,
            Err(AeadError::Authentication { reason }) if reason.contains("tag")
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let key = test_key(0);
        let sealed = encrypt_bytes(b"original message", &key).unwrap();

        let mut tampered = sealed.to_vec();
        tampered[NONCE_SIZE] ^= 0x01;

        assert!(decrypt_bytes(&tampered, &key).unwrap_err().is_authentication());
    }

    #[test]
    fn tampered_nonce_fails_decryption() {
        let key = test_key(0);
        let sealed = encrypt_bytes(b"original message", &key).unwrap();

        let mut tampered = sealed.to_vec();
        tampered[0] ^= 0x80;

        assert!(decrypt_bytes(&tampered, &key).unwrap_err().is_authentication());
    }

    #[test]
    fn truncated_ciphertext_fails_decryption() {
        let key = test_key(0);
        let sealed = encrypt_bytes(b"original message", &key).unwrap();

        for len in [0, 1, NONCE_SIZE, CIPHERTEXT_OVERHEAD - 1, sealed.len() - 1] {
            let result = decrypt_bytes(&sealed[..len], &key);
            assert!(result.unwrap_err().is_authentication(), "length {len} must be rejected");
        }
    }

    #[test]
    fn buf_variants_drain_their_input() {
        let key = test_key(9);
        let mut sealed_input = Bytes::from_static(b"buffered payload");

        let sealed = encrypt_buf(&mut sealed_input, &key).unwrap();
        assert!(sealed_input.is_empty());

        let opened = decrypt_buf(sealed, &key).unwrap();
        assert_eq!(opened.as_ref(), b"buffered payload");
    }
}
