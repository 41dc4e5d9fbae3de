//! HTTP upload sink with exponential backoff.
//!
//! POSTs each event to the configured endpoint. Server errors and
//! transport failures retry with a doubling wait capped at 60 seconds;
//! client errors are terminal. Backoff waits honor cancellation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

use super::{Sink, SinkError};

/// Ceiling on the backoff wait between attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// HTTP sink parameters.
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    pub endpoint: String,
    /// Bearer token, sent as `Authorization` when present.
    pub auth_token: Option<String>,
    pub timeout: Duration,
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub initial_wait: Duration,
}

impl HttpSinkConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: None,
            timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_wait: Duration::from_secs(1),
        }
    }
}

/// What one delivery attempt concluded.
enum Attempt {
    Delivered,
    /// 4xx: the payload will never be accepted; do not retry.
    Rejected(String),
    /// 5xx or transport: worth retrying.
    Failed(String),
}

/// POSTs events to a collection endpoint. The underlying client pools
/// connections; concurrent writes are fine.
#[derive(Debug, Clone)]
pub struct HttpSink {
    config: HttpSinkConfig,
    client: Client,
    cancel: CancellationToken,
}

impl HttpSink {
    pub fn new(config: HttpSinkConfig, cancel: CancellationToken) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SinkError::new("http", "init", "-", e.to_string(), false))?;

        Ok(Self {
            config,
            client,
            cancel,
        })
    }

    async fn send(&self, data: &[u8], printer_id: &str) -> Attempt {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Printer-ID", printer_id)
            .body(data.to_vec());

        if let Some(token) = &self.config.auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Failed(format!("http request failed: {e}")),
        };

        let status = response.status();
        if status.is_success() {
            return Attempt::Delivered;
        }

        let body = response.text().await.unwrap_or_default();
        if is_retryable_status(status) {
            Attempt::Failed(format!("server error (HTTP {}): {body}", status.as_u16()))
        } else {
            Attempt::Rejected(format!("client error (HTTP {}): {body}", status.as_u16()))
        }
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn write(&self, data: &[u8], printer_id: &str) -> Result<(), SinkError> {
        if data.is_empty() {
            return Err(SinkError::new(
                "http",
                "write",
                printer_id,
                "empty event payload",
                false,
            ));
        }

        let mut wait = self.config.initial_wait;
        let mut last_failure = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = self.cancel.cancelled() => {
                        return Err(SinkError::new(
                            "http",
                            "write",
                            printer_id,
                            format!("cancelled after {attempt} attempts"),
                            false,
                        ));
                    }
                }
                wait = (wait * 2).min(MAX_BACKOFF);
            }

            match self.send(data, printer_id).await {
                Attempt::Delivered => return Ok(()),
                Attempt::Rejected(message) => {
                    return Err(SinkError::new("http", "write", printer_id, message, false));
                }
                Attempt::Failed(message) => {
                    tracing::debug!(printer_id, attempt, message, "upload attempt failed");
                    last_failure = message;
                }
            }
        }

        Err(SinkError::new(
            "http",
            "write",
            printer_id,
            format!(
                "failed after {} attempts: {last_failure}",
                self.config.max_retries + 1
            ),
            true,
        ))
    }

    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Classify a status code under the retry policy. Every 4xx is terminal,
/// including 429; 5xx retries.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn test_backoff_doubling_caps_at_sixty_seconds() {
        let mut wait = Duration::from_secs(1);
        let mut waits = Vec::new();
        for _ in 0..8 {
            wait = (wait * 2).min(MAX_BACKOFF);
            waits.push(wait);
        }
        assert_eq!(waits[0], Duration::from_secs(2));
        assert_eq!(waits[5], Duration::from_secs(60));
        assert_eq!(*waits.last().unwrap(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_cancelled_backoff_reports_attempts() {
        let cancel = CancellationToken::new();
        let sink = HttpSink::new(
            HttpSinkConfig {
                // TEST-NET-1: nothing listens, every attempt fails.
                endpoint: "http://192.0.2.1:9/telemetry".to_string(),
                auth_token: None,
                timeout: Duration::from_millis(100),
                max_retries: 3,
                initial_wait: Duration::from_secs(30),
            },
            cancel.clone(),
        )
        .unwrap();

        cancel.cancel();
        let err = sink.write(b"{}", "10.0.0.5").await.unwrap_err();
        assert!(!err.retryable);
        assert!(err.message.contains("cancelled after 1 attempts"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_rejected() {
        let sink = HttpSink::new(
            HttpSinkConfig::new("http://192.0.2.1/telemetry"),
            CancellationToken::new(),
        )
        .unwrap();
        let err = sink.write(b"", "p").await.unwrap_err();
        assert!(!err.retryable);
    }
}
