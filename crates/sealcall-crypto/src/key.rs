//! AEAD key handles.

use std::fmt;

use zeroize::Zeroize;

/// Size of an `XChaCha20-Poly1305` key in bytes.
pub const KEY_SIZE: usize = 32;

/// Symmetric key for `XChaCha20-Poly1305`.
///
/// Key material arrives already initialized; this crate never generates or
/// rotates keys. Handles are shared between concurrent calls behind an
/// `Arc`, and every operation on them is read-only.
#[derive(Clone)]
pub struct AeadKey {
    key: [u8; KEY_SIZE],
}

impl AeadKey {
    /// Wrap raw key material.
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Wrap a key from a slice, or `None` if it is not [`KEY_SIZE`] bytes.
    pub fn from_slice(key: &[u8]) -> Option<Self> {
        let key: [u8; KEY_SIZE] = key.try_into().ok()?;
        Some(Self { key })
    }

    /// 32-byte symmetric key.
    pub(crate) fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AeadKey(..)")
    }
}

// Key bytes must not outlive the handle
impl Drop for AeadKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_key_material() {
        let key = AeadKey::from_bytes([0xAB; KEY_SIZE]);
        let rendered = format!("{key:?}");

        assert_eq!(rendered, "AeadKey(..)");
        assert!(!rendered.contains("171"));
    }

    #[test]
    fn from_slice_requires_exact_length() {
        assert!(AeadKey::from_slice(&[0u8; KEY_SIZE]).is_some());
        assert!(AeadKey::from_slice(&[0u8; KEY_SIZE - 1]).is_none());
        assert!(AeadKey::from_slice(&[0u8; KEY_SIZE + 1]).is_none());
        assert!(AeadKey::from_slice(&[]).is_none());
    }
}
