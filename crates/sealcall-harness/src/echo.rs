//! Typed hello/echo service.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use sealcall_core::{Code, Codec, MethodDescriptor, Request, Response, Service, Status};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::cbor::CborCodec;

/// Fully qualified name of the hello method.
pub const HELLO_METHOD: &str = "sealcall.test.Echo/Hello";

/// Request message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloRequest {
    /// Text to echo
    pub payload: String,
}

impl HelloRequest {
    /// Request carrying `payload`.
    pub fn new(payload: impl Into<String>) -> Self {
        Self { payload: payload.into() }
    }
}

/// Response message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    /// `echo:` followed by the request payload
    pub payload: String,
}

/// Descriptor for the hello method with plain CBOR codecs.
pub fn hello_method() -> MethodDescriptor<HelloRequest, HelloResponse> {
    MethodDescriptor::new(
        HELLO_METHOD,
        Arc::new(CborCodec::<HelloRequest>::new()),
        Arc::new(CborCodec::<HelloResponse>::new()),
    )
}

/// Answers every [`HelloRequest`] with `echo:<payload>`.
///
/// The handler decodes its own input, so a body it cannot parse (ciphertext,
/// say) fails the call with `InvalidArgument`.
#[derive(Default)]
pub struct EchoService {
    request_codec: CborCodec<HelloRequest>,
    response_codec: CborCodec<HelloResponse>,
    invocations: AtomicUsize,
    received: Mutex<Vec<Bytes>>,
}

impl EchoService {
    /// Service with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the handler ran.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Every body the handler was given, in arrival order.
    pub async fn received(&self) -> Vec<Bytes> {
        self.received.lock().await.clone()
    }

    fn answer(&self, body: Bytes) -> Result<Bytes, Status> {
        let request = self
            .request_codec
            .decode(body)
            .map_err(|err| Status::new(Code::InvalidArgument, err.to_string()))?;

        let response = HelloResponse { payload: format!("echo:{}", request.payload) };
        self.response_codec
            .encode(&response)
            .map_err(|err| Status::new(Code::Internal, err.to_string()))
    }
}

#[async_trait]
impl Service for EchoService {
    async fn call(&self, request: Request) -> Result<Response, Status> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if request.method != HELLO_METHOD {
            return Err(Status::new(Code::NotFound, format!("no method {}", request.method)));
        }

        self.received.lock().await.extend(request.messages.iter().cloned());

        let messages =
            request.messages.into_iter().map(|body| self.answer(body)).collect::<Result<_, _>>()?;
        Ok(Response::new(messages))
    }
}
