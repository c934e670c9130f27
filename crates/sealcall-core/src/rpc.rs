//! Host call-framework seams.
//!
//! The smallest surface the encryption decorators need from an RPC
//! framework: method descriptors carrying per-direction codecs, a byte-level
//! [`Channel`] on the calling side, a byte-level [`Service`] on the receiving
//! side, and a [`ClientInterceptor`] hook. Transports implement [`Channel`];
//! applications implement [`Service`].
//!
//! A call carries one or more messages in each direction. Every message is
//! encoded (and sealed) on its own, so streaming calls simply repeat the
//! per-message work.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::{codec::Codec, error::CallError, metadata::Metadata};

/// Failure class reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// Call was cancelled by the host
    Cancelled,
    /// Request was malformed
    InvalidArgument,
    /// Unknown method
    NotFound,
    /// Caller could not be authenticated
    Unauthenticated,
    /// Receiver failed internally
    Internal,
    /// Receiver could not be reached
    Unavailable,
    /// Handler failed with an unclassified error
    Unknown,
}

/// Error status returned across the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code:?}: {message}")]
pub struct Status {
    code: Code,
    message: String,
}

impl Status {
    /// Create a status.
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Failure class.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Human-readable detail.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Incoming or outgoing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Fully qualified method name
    pub method: String,
    /// Headers sent with the call
    pub metadata: Metadata,
    /// Encoded request messages, in order
    pub messages: Vec<Bytes>,
}

impl Request {
    /// Request with empty metadata.
    pub fn new(method: impl Into<String>, messages: Vec<Bytes>) -> Self {
        Self { method: method.into(), metadata: Metadata::new(), messages }
    }
}

/// Result of a successful call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Encoded response messages, in order
    pub messages: Vec<Bytes>,
}

impl Response {
    /// Response carrying `messages`.
    pub fn new(messages: Vec<Bytes>) -> Self {
        Self { messages }
    }
}

/// Method name plus the codecs for each direction.
pub struct MethodDescriptor<Req, Resp> {
    name: Arc<str>,
    request_codec: Arc<dyn Codec<Req>>,
    response_codec: Arc<dyn Codec<Resp>>,
}

impl<Req, Resp> MethodDescriptor<Req, Resp> {
    /// Describe a method.
    pub fn new(
        name: impl Into<Arc<str>>,
        request_codec: Arc<dyn Codec<Req>>,
        response_codec: Arc<dyn Codec<Resp>>,
    ) -> Self {
        Self { name: name.into(), request_codec, response_codec }
    }

    /// Fully qualified method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Codec for request messages.
    pub fn request_codec(&self) -> &Arc<dyn Codec<Req>> {
        &self.request_codec
    }

    /// Codec for response messages.
    pub fn response_codec(&self) -> &Arc<dyn Codec<Resp>> {
        &self.response_codec
    }

    /// Same method with different codecs.
    pub fn with_codecs(
        &self,
        request_codec: Arc<dyn Codec<Req>>,
        response_codec: Arc<dyn Codec<Resp>>,
    ) -> Self {
        Self { name: Arc::clone(&self.name), request_codec, response_codec }
    }
}

impl<Req, Resp> Clone for MethodDescriptor<Req, Resp> {
    fn clone(&self) -> Self {
        self.with_codecs(Arc::clone(&self.request_codec), Arc::clone(&self.response_codec))
    }
}

impl<Req, Resp> fmt::Debug for MethodDescriptor<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Calling side of a transport.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Deliver a call and wait for its response.
    async fn invoke(&self, request: Request) -> Result<Response, CallError>;
}

/// Receiving side: handles one call.
///
/// Implementations are shared by every concurrent call and must not keep
/// per-call state in `self`.
#[async_trait]
pub trait Service: Send + Sync {
    /// Handle a call.
    async fn call(&self, request: Request) -> Result<Response, Status>;
}

#[async_trait]
impl<S> Service for Arc<S>
where
    S: Service + ?Sized,
{
    async fn call(&self, request: Request) -> Result<Response, Status> {
        (**self).call(request).await
    }
}

/// Hook run by [`Client`] when it starts a call.
pub trait ClientInterceptor: Send + Sync {
    /// Rewrite the method descriptor (typically its codecs) for this call.
    fn intercept_method<Req, Resp>(
        &self,
        method: &MethodDescriptor<Req, Resp>,
    ) -> MethodDescriptor<Req, Resp>
    where
        Req: 'static,
        Resp: 'static;

    /// Adjust outgoing metadata before it is sent.
    fn start(&self, metadata: &mut Metadata) -> Result<(), CallError>;
}

/// Interceptor that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterceptor;

impl ClientInterceptor for NoInterceptor {
    fn intercept_method<Req, Resp>(
        &self,
        method: &MethodDescriptor<Req, Resp>,
    ) -> MethodDescriptor<Req, Resp>
    where
        Req: 'static,
        Resp: 'static,
    {
        method.clone()
    }

    fn start(&self, _metadata: &mut Metadata) -> Result<(), CallError> {
        Ok(())
    }
}

/// Typed client over a [`Channel`].
#[derive(Debug, Clone)]
pub struct Client<C, I = NoInterceptor> {
    channel: C,
    interceptor: I,
}

impl<C> Client<C>
where
    C: Channel,
{
    /// Client without an interceptor.
    pub fn new(channel: C) -> Self {
        Self { channel, interceptor: NoInterceptor }
    }
}

impl<C, I> Client<C, I>
where
    C: Channel,
    I: ClientInterceptor,
{
    /// Client that runs `interceptor` on every call.
    pub fn with_interceptor(channel: C, interceptor: I) -> Self {
        Self { channel, interceptor }
    }

    /// Underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Interceptor applied to every call.
    pub fn interceptor(&self) -> &I {
        &self.interceptor
    }

    /// Call with exactly one request and one response message.
    pub async fn unary<Req, Resp>(
        &self,
        method: &MethodDescriptor<Req, Resp>,
        metadata: Metadata,
        request: &Req,
    ) -> Result<Resp, CallError>
    where
        Req: Sync + 'static,
        Resp: 'static,
    {
        let mut responses = self.streaming(method, metadata, std::slice::from_ref(request)).await?;
        match responses.len() {
            1 => responses.pop().ok_or_else(|| unexpected_count(0)),
            n => Err(unexpected_count(n)),
        }
    }

    /// Call carrying any number of messages in each direction.
    ///
    /// Each message passes through the (possibly intercepted) codec on its
    /// own.
    pub async fn streaming<Req, Resp>(
        &self,
        method: &MethodDescriptor<Req, Resp>,
        mut metadata: Metadata,
        requests: &[Req],
    ) -> Result<Vec<Resp>, CallError>
    where
        Req: Sync + 'static,
        Resp: 'static,
    {
        let method = self.interceptor.intercept_method(method);
        self.interceptor.start(&mut metadata)?;

        let messages = requests
            .iter()
            .map(|request| method.request_codec().encode(request))
            .collect::<Result<Vec<_>, _>>()?;

        let request = Request { method: method.name().to_string(), metadata, messages };
        let response = self.channel.invoke(request).await?;

        response.messages.into_iter().map(|wire| method.response_codec().decode(wire)).collect()
    }
}

fn unexpected_count(count: usize) -> CallError {
    CallError::Status(Status::new(
        Code::Internal,
        format!("unary call returned {count} response messages"),
    ))
}
