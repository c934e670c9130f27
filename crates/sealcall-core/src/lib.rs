//! sealcall call layer
//!
//! End-to-end encryption of RPC message bodies, added to an existing call
//! framework by wrapping its codecs. Transport security (TLS) protects each
//! hop; this layer protects the message itself, so intermediaries that
//! terminate TLS only ever see ciphertext.
//!
//! # Architecture
//!
//! ```text
//!            caller                                      receiver
//! ┌──────────────────────────┐                 ┌────────────────────────────┐
//! │ Client + CallerEncryptor │   identity hdr  │ SealedService              │
//! │   RequestEncryptor       │ ──────────────> │   CallContext per call     │
//! │   ResponseDecryptor      │   sealed bodies │   RequestDecryptor         │
//! │                          │ <─────────────> │   ResponseEncryptor        │
//! └──────────────────────────┘                 │   KeyDirectory lookup      │
//!                                              └────────────────────────────┘
//! ```
//!
//! - [`CallerEncryptor`] holds one caller's keys and names it in the
//!   [`IDENTITY_HEADER`] side channel
//! - [`SealedService`] reads that header into a per-call [`CallContext`] and
//!   resolves keys from a [`KeyDirectory`]
//! - What happens when no key matches is decided by the
//!   [`UnknownIdentityPolicy`]; there is no default
//!
//! Every message is sealed independently with the AEAD adapter from
//! `sealcall-crypto`. Keys are provisioned by the host; nothing here derives,
//! rotates, or negotiates them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod caller;
pub mod codec;
pub mod config;
pub mod directory;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod receiver;
pub mod rpc;
pub mod seal;

pub use caller::CallerEncryptor;
pub use codec::{BytesCodec, Codec};
pub use config::{ParsePolicyError, ReceiverConfig, UnknownIdentityPolicy};
pub use directory::{KeyDirectory, KeyDirectoryEntry};
pub use error::{CallError, CodecError, Direction};
pub use identity::{CallContext, CallerIdentity, IDENTITY_HEADER, IdentityError};
pub use metadata::{Metadata, MetadataError};
pub use receiver::{ReceiverPhase, SealedService};
pub use rpc::{
    Channel, Client, ClientInterceptor, Code, MethodDescriptor, NoInterceptor, Request, Response,
    Service, Status,
};
pub use seal::{
    ContextCodec, RequestDecryptor, RequestEncryptor, ResponseDecryptor, ResponseEncryptor,
};
