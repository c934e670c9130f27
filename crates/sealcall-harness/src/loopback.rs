//! In-process transport.
//!
//! [`LoopbackChannel`] hands each call to the service on a freshly spawned
//! tokio task, so concurrent calls really do run concurrently on a
//! multi-threaded runtime. Bodies are passed through untouched; a [`WireTap`]
//! sees exactly what a network intermediary would.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use sealcall_core::{
    CallError, Channel, Code, Direction, Metadata, Request, Response, Service, Status,
};
use tokio::{sync::Mutex, task::JoinError};

/// One body observed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TappedMessage {
    /// Method the body belonged to
    pub method: String,
    /// Which way it travelled
    pub direction: Direction,
    /// Headers sent with the call
    pub metadata: Metadata,
    /// Body exactly as transmitted
    pub body: Bytes,
}

/// Records every body passing through a [`LoopbackChannel`].
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct WireTap {
    messages: Arc<Mutex<Vec<TappedMessage>>>,
}

impl WireTap {
    /// Empty tap.
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(
        &self,
        method: &str,
        direction: Direction,
        metadata: &Metadata,
        bodies: &[Bytes],
    ) {
        let mut messages = self.messages.lock().await;
        messages.extend(bodies.iter().map(|body| TappedMessage {
            method: method.to_string(),
            direction,
            metadata: metadata.clone(),
            body: body.clone(),
        }));
    }

    /// Everything recorded so far, in transmission order.
    pub async fn messages(&self) -> Vec<TappedMessage> {
        self.messages.lock().await.clone()
    }

    /// Returns true if `needle` occurs inside any recorded body.
    pub async fn saw(&self, needle: &[u8]) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.messages
            .lock()
            .await
            .iter()
            .any(|m| m.body.windows(needle.len()).any(|window| window == needle))
    }

    /// Forget everything recorded.
    pub async fn clear(&self) {
        self.messages.lock().await.clear();
    }
}

/// [`Channel`] delivering calls to an in-process [`Service`].
#[derive(Clone)]
pub struct LoopbackChannel {
    service: Arc<dyn Service>,
    tap: Option<WireTap>,
}

impl LoopbackChannel {
    /// Channel to `service` with no tap.
    pub fn new(service: Arc<dyn Service>) -> Self {
        Self { service, tap: None }
    }

    /// Channel to `service` that records bodies in `tap`.
    pub fn tapped(service: Arc<dyn Service>, tap: WireTap) -> Self {
        Self { service, tap: Some(tap) }
    }

    /// Attached tap, if any.
    pub fn tap(&self) -> Option<&WireTap> {
        self.tap.as_ref()
    }
}

/// Status for a receiver task that never produced a result.
fn join_failure(err: JoinError) -> CallError {
    let status = if err.is_cancelled() {
        Status::new(Code::Cancelled, "receiver task cancelled")
    } else {
        Status::new(Code::Unknown, format!("receiver task failed: {err}"))
    };
    CallError::Status(status)
}

#[async_trait]
impl Channel for LoopbackChannel {
    async fn invoke(&self, request: Request) -> Result<Response, CallError> {
        let method = request.method.clone();
        let metadata = request.metadata.clone();
        if let Some(tap) = &self.tap {
            tap.record(&method, Direction::Request, &metadata, &request.messages).await;
        }

        let service = Arc::clone(&self.service);
        let handle = tokio::spawn(async move { service.call(request).await });

        let response = handle.await.map_err(join_failure)??;

        if let Some(tap) = &self.tap {
            tap.record(&method, Direction::Response, &metadata, &response.messages).await;
        }
        Ok(response)
    }
}
