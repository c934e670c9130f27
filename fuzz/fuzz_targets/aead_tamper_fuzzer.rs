//! Fuzz target for the AEAD adapter
//!
//! Seals arbitrary plaintext, applies an arbitrary mutation to the wire
//! bytes, and opens the result.
//!
//! # Strategy
//!
//! - Arbitrary keys, nonces, and plaintext (including empty)
//! - Single bit flips anywhere in nonce, ciphertext, or tag
//! - Truncation and extension of the wire bytes
//! - Opening with a different key
//! - Opening completely arbitrary input
//!
//! # Invariants
//!
//! - Unmodified wire bytes open to the original plaintext
//! - Wire length is always plaintext + 40 bytes
//! - Every mutation fails with an authentication error
//! - Arbitrary input never panics

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sealcall_crypto::{
    AeadKey, CIPHERTEXT_OVERHEAD, KEY_SIZE, NONCE_SIZE, decrypt_bytes, encrypt_bytes_with_nonce,
};

#[derive(Debug, Arbitrary)]
struct TamperScenario {
    key: [u8; KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    plaintext: Vec<u8>,
    mutation: Mutation,
    /// Raw bytes fed straight to the opener
    garbage: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
enum Mutation {
    None,
    FlipBit { position: u16, bit: u8 },
    Truncate { keep: u16 },
    Extend { extra: Vec<u8> },
    OtherKey { key: [u8; KEY_SIZE] },
}

fuzz_target!(|scenario: TamperScenario| {
    let key = AeadKey::from_bytes(scenario.key);

    // Arbitrary input must fail cleanly or (with negligible probability) open
    let _ = decrypt_bytes(&scenario.garbage, &key);

    let Ok(wire) = encrypt_bytes_with_nonce(&scenario.plaintext, &key, scenario.nonce) else {
        return;
    };
    assert_eq!(wire.len(), scenario.plaintext.len() + CIPHERTEXT_OVERHEAD);

    let mut tampered = wire.to_vec();
    let opener = match scenario.mutation {
        Mutation::None => {
            let opened = decrypt_bytes(&wire, &key).expect("untouched wire must open");
            assert_eq!(opened.as_ref(), scenario.plaintext.as_slice());
            return;
        },
        Mutation::FlipBit { position, bit } => {
            let index = usize::from(position) % tampered.len();
            tampered[index] ^= 1 << (bit % 8);
            key
        },
        Mutation::Truncate { keep } => {
            tampered.truncate(usize::from(keep) % tampered.len());
            key
        },
        Mutation::Extend { extra } => {
            if extra.is_empty() {
                return;
            }
            tampered.extend_from_slice(&extra);
            key
        },
        Mutation::OtherKey { key: other } => {
            if other == scenario.key {
                return;
            }
            AeadKey::from_bytes(other)
        },
    };

    let err = decrypt_bytes(&tampered, &opener).expect_err("mutated wire must not open");
    assert!(err.is_authentication(), "unexpected error: {err}");
});
