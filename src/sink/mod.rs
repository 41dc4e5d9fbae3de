//! Event sinks: where serialized telemetry goes.
//!
//! A sink receives the JSON octet stream for one printer's event. The
//! file sink queues locally; the HTTP sink uploads with retry. Sink
//! failures surface per event and never abort the pipeline.

pub mod file;
pub mod http;

pub use file::FileSink;
pub use http::{HttpSink, HttpSinkConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Terminal destination for serialized events.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Deliver one event payload for the given printer.
    async fn write(&self, data: &[u8], printer_id: &str) -> Result<(), SinkError>;

    /// Release any held resources.
    async fn close(&self) -> Result<(), SinkError>;
}

/// A sink failure with enough context to log and triage.
#[derive(Debug, Error)]
#[error("[{sink}] {operation} failed for printer {printer_id}: {message}")]
pub struct SinkError {
    pub sink: &'static str,
    pub operation: &'static str,
    pub printer_id: String,
    pub message: String,
    /// Whether retrying the same write could succeed.
    pub retryable: bool,
}

impl SinkError {
    pub fn new(
        sink: &'static str,
        operation: &'static str,
        printer_id: &str,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            sink,
            operation,
            printer_id: printer_id.to_string(),
            message: message.into(),
            retryable,
        }
    }
}
