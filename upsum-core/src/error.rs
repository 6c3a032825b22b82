//! Error taxonomy for the update-report pipeline.
//!
//! Every stage returns a typed error; the orchestrator never catches a generic
//! failure. [`ConfigError`] is raised before the pipeline starts, [`PipelineError`]
//! by the stages themselves. The capability traits in [`crate::contract`] return
//! their own narrower errors which the stages map onto [`PipelineError`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration problems detected before any stage runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required variables are unset or empty.
    #[error("Required configuration is not set: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A variable is set but its value cannot be used.
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// The external call a timeout was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summarize,
    Deliver,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Summarize => f.write_str("summarize"),
            Stage::Deliver => f.write_str("deliver"),
        }
    }
}

/// Terminal failures of a pipeline run. Each maps to one user-visible line.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Log file or directory not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read log file {}: {source}", .path.display())]
    LogUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Summary generation failed: {0}")]
    SummarizationFailed(#[source] SummarizeError),

    #[error("SMTP authentication failed. Check SMTP_USER and SMTP_PASSWORD: {0}")]
    AuthenticationFailed(String),

    #[error("SMTP delivery failed: {0}")]
    TransportFailed(String),

    #[error("Timed out after {after:?} during {stage}")]
    Timeout { stage: Stage, after: Duration },
}

// A collaborator that gives up on its own deadline is still a timeout of its stage.
impl From<SummarizeError> for PipelineError {
    fn from(e: SummarizeError) -> Self {
        match e {
            SummarizeError::TimedOut(after) => PipelineError::Timeout {
                stage: Stage::Summarize,
                after,
            },
            other => PipelineError::SummarizationFailed(other),
        }
    }
}

impl From<TransportError> for PipelineError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Authentication(detail) => PipelineError::AuthenticationFailed(detail),
            TransportError::Transport(detail) => PipelineError::TransportFailed(detail),
            TransportError::TimedOut(after) => PipelineError::Timeout {
                stage: Stage::Deliver,
                after,
            },
        }
    }
}

/// Failures signalled by a [`crate::contract::Summarizer`].
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("request timed out after {0:?}")]
    TimedOut(Duration),
}

/// Failures signalled by a [`crate::contract::MailTransport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("{0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_timeouts_become_stage_timeouts() {
        let after = Duration::from_secs(35);
        assert!(matches!(
            PipelineError::from(SummarizeError::TimedOut(after)),
            PipelineError::Timeout { stage: Stage::Summarize, after: a } if a == after
        ));
        assert!(matches!(
            PipelineError::from(TransportError::TimedOut(after)),
            PipelineError::Timeout { stage: Stage::Deliver, after: a } if a == after
        ));
        assert!(matches!(
            PipelineError::from(SummarizeError::EmptyResponse),
            PipelineError::SummarizationFailed(SummarizeError::EmptyResponse)
        ));
    }
}
