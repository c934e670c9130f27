//! Fuzz target for the receiver decorator
//!
//! Drives [`SealedService`] with arbitrary identity headers, policies, and
//! bodies, some correctly sealed and some not.
//!
//! # Strategy
//!
//! - Identity header absent, empty, known, unknown, or malformed
//! - Both key-miss policies
//! - Bodies sealed with the right key, the wrong key, or left raw
//! - Multi-message calls mixing good and bad bodies
//!
//! # Invariants
//!
//! - The handler never runs if any body fails authentication
//! - The handler never runs for an unprovisioned caller under `Reject`
//! - A known caller whose bodies are all sealed correctly always succeeds,
//!   and every response opens with its response key
//! - Nothing panics

#![no_main]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use arbitrary::Arbitrary;
use async_trait::async_trait;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use sealcall_core::{
    CallerIdentity, KeyDirectory, KeyDirectoryEntry, Metadata, ReceiverConfig, Request,
    Response, SealedService, Service, Status, UnknownIdentityPolicy, IDENTITY_HEADER,
};
use sealcall_crypto::{decrypt_bytes, encrypt_bytes, AeadKey};

const KNOWN: &str = "KNOWN";

#[derive(Debug, Arbitrary)]
struct PipelineScenario {
    header: Header,
    reject_unknown: bool,
    bodies: Vec<Body>,
}

#[derive(Debug, Arbitrary)]
enum Header {
    Absent,
    Empty,
    Known,
    Unknown(u8),
    Raw(String),
}

#[derive(Debug, Arbitrary)]
enum Body {
    SealedRight(Vec<u8>),
    SealedWrong(Vec<u8>),
    Raw(Vec<u8>),
}

/// Echoes bodies and counts invocations.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

#[async_trait]
impl Service for Counting {
    async fn call(&self, request: Request) -> Result<Response, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(request.messages))
    }
}

fuzz_target!(|scenario: PipelineScenario| {
    let request_key = Arc::new(AeadKey::from_bytes([0x11; 32]));
    let response_key = Arc::new(AeadKey::from_bytes([0x22; 32]));
    let wrong_key = AeadKey::from_bytes([0x33; 32]);

    let directory = Arc::new(KeyDirectory::from_entries([(
        CallerIdentity::new(KNOWN).expect("constant identity"),
        KeyDirectoryEntry::new(Arc::clone(&request_key), Arc::clone(&response_key)),
    )]));
    let policy = if scenario.reject_unknown {
        UnknownIdentityPolicy::Reject
    } else {
        UnknownIdentityPolicy::Passthrough
    };
    let counting = Arc::new(Counting::default());
    let service =
        SealedService::new(Arc::clone(&counting), directory, ReceiverConfig::new(policy));

    let mut metadata = Metadata::new();
    let header = match &scenario.header {
        Header::Absent => None,
        Header::Empty => Some(String::new()),
        Header::Known => Some(KNOWN.to_string()),
        Header::Unknown(n) => Some(format!("CALLER_{n}")),
        Header::Raw(raw) => Some(raw.clone()),
    };
    if let Some(value) = &header {
        // Values the header collection refuses never reach the receiver
        if metadata.insert(IDENTITY_HEADER, value.as_str()).is_err() {
            return;
        }
    }
    let known = header.as_deref() == Some(KNOWN);

    let mut all_sealed_right = true;
    let mut messages = Vec::with_capacity(scenario.bodies.len());
    for body in &scenario.bodies {
        let wire = match body {
            Body::SealedRight(plain) => encrypt_bytes(plain, &request_key),
            Body::SealedWrong(plain) => {
                all_sealed_right = false;
                encrypt_bytes(plain, &wrong_key)
            },
            Body::Raw(raw) => {
                all_sealed_right = false;
                Ok(Bytes::copy_from_slice(raw))
            },
        };
        match wire {
            Ok(wire) => messages.push(wire),
            Err(_) => return,
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("current-thread runtime");
    let request = Request { method: "fuzz.Svc/Call".to_string(), metadata, messages };
    let result = runtime.block_on(service.call(request));
    let calls = counting.calls.load(Ordering::SeqCst);

    if known {
        if all_sealed_right {
            let response = result.expect("correctly sealed call must succeed");
            assert_eq!(calls, 1);
            for message in &response.messages {
                decrypt_bytes(message, &response_key).expect("response must open");
            }
        } else if !scenario.bodies.is_empty() {
            // At least one body fails authentication under the known key
            assert!(result.is_err());
            assert_eq!(calls, 0);
        }
    } else if scenario.reject_unknown {
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }
});
