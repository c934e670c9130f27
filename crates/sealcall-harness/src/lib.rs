//! Test harness for the sealcall call layer.
//!
//! Stands in for a real RPC stack so the decorators can be exercised end to
//! end inside one process:
//!
//! - [`LoopbackChannel`] delivers each call to a [`Service`] on its own tokio
//!   task, optionally recording every body that crosses it in a [`WireTap`]
//! - [`CborCodec`] is the application serializer
//! - [`EchoService`] answers `hello` with `echo:hello` and counts how often
//!   its handler ran
//! - [`LogCapture`] collects formatted `tracing` output
//! - [`Fixture`] holds the identities and keys shared by the integration tests
//!
//! [`Service`]: sealcall_core::Service

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cbor;
pub mod echo;
pub mod fixtures;
pub mod log_capture;
pub mod loopback;

pub use cbor::CborCodec;
pub use echo::{EchoService, HELLO_METHOD, HelloRequest, HelloResponse, hello_method};
pub use fixtures::{CLIENT_A, CLIENT_C, Fixture, UNKNOWN_CLIENT, random_key};
pub use log_capture::LogCapture;
pub use loopback::{LoopbackChannel, TappedMessage, WireTap};
