//! Transport to the inference service
//!
//! One request per outgoing message. Every failure comes back as a
//! `TransportError`, never as a panic.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use types::{Passage, ResponsePayload};

use crate::mode::OperationTarget;
use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for sending a message to a backend operation
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one message to the given operation
    async fn send(
        &self,
        target: &OperationTarget,
        message: &str,
    ) -> Result<ResponsePayload, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        target: &OperationTarget,
        message: &str,
    ) -> Result<ResponsePayload, TransportError> {
        (**self).send(target, message).await
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport {
    inner: Arc<dyn Transport>,
}

impl LoggingTransport {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for LoggingTransport {
    async fn send(
        &self,
        target: &OperationTarget,
        message: &str,
    ) -> Result<ResponsePayload, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(target, message).await;
        let duration = start.elapsed();

        match &result {
            Ok(payload) => {
                tracing::info!(
                    target_path = %target,
                    duration_ms = %duration.as_millis(),
                    shape = payload.shape(),
                    entries = payload.entry_count(),
                    "Dispatch completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    target_path = %target,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Dispatch failed"
                );
            }
        }

        result
    }
}
