//! # contract: the two external capabilities the pipeline depends on
//!
//! The pipeline never talks to a network itself. It asks a [`Summarizer`] for
//! report text and hands the finished [`MailMessage`] to a [`MailTransport`].
//! Concrete clients (Gemini over HTTP, SMTP) live in the `upsum` binary crate;
//! tests use the generated mocks.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so consumers can build
//!   deterministic mocks (`MockSummarizer`, `MockMailTransport`).
//! - Mocks are exported under the `test-export-mocks` feature for integration
//!   tests in other crates.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{SummarizeError, TransportError};

/// A fully assembled outgoing message: one plain-text and one HTML alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub plain_body: String,
    pub html_body: String,
}

/// Text-completion service used to turn the prompt into report text.
///
/// Implementors must treat an empty completion as [`SummarizeError::EmptyResponse`]
/// and their own deadline expiring as [`SummarizeError::TimedOut`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate text for a single prompt. No streaming, no retry.
    async fn generate(&self, prompt: &str) -> Result<String, SummarizeError>;
}

/// Outbound mail delivery.
///
/// Connection parameters (host, port, credentials) are owned by the
/// implementor; the pipeline only supplies the message.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submit the message. Authentication failures must be reported as
    /// [`TransportError::Authentication`], expired deadlines as
    /// [`TransportError::TimedOut`].
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError>;
}
