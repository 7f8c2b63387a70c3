//! HTTP transport for the per-mode JSON routes

use super::types::{decode_payload, MessageRequest};
use super::{ResponsePayload, Transport, TransportError};
use crate::config::ClientConfig;
use crate::mode::OperationTarget;
use async_trait::async_trait;
use reqwest::Client;

/// Sends `POST {base}{target}` with a `{"message": ...}` body
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, target: &OperationTarget) -> String {
        format!("{}{}", self.base_url, target.path())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        target: &OperationTarget,
        message: &str,
    ) -> Result<ResponsePayload, TransportError> {
        let url = self.url_for(target);
        tracing::debug!(url = %url, "Sending message");

        let response = self
            .client
            .post(&url)
            .json(&MessageRequest { message })
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(TransportError::status(status.as_u16(), &body));
        }

        decode_payload(&body).map_err(|e| {
            TransportError::decode(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}
