//! High-level pipeline: orchestrates locate → parse → compose → deliver for one update log.
//!
//! # Responsibilities
//! - Strictly sequential, fail-fast orchestration: the first failing stage ends the run
//! - One `info!` event per state transition so a run can be followed in the logs
//! - Bounded waits on both external calls; expiry becomes [`PipelineError::Timeout`]
//! - `NoLogsAvailable` is the single early exit that is not a failure
//!
//! # Error Handling
//! Every stage returns a typed [`PipelineError`]; the run stops at the first one and
//! moves to [`PipelineState::Failed`]. Nothing is retried or rolled back.
//!
//! # Navigation
//! - Main entrypoint: [`Pipeline::run`], or [`run_pipeline`] for a one-shot call
//! - Supporting types: [`PipelineState`], [`PipelineOutcome`]

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

use crate::compose::{compose, Report};
use crate::config::PipelineConfig;
use crate::contract::{MailTransport, Summarizer};
use crate::deliver::{deliver, DeliveryStatus};
use crate::error::{PipelineError, Stage};
use crate::locate::{locate, LocateOutcome, LogFile};
use crate::parse::{parse, read_log, ParsedUpdateFacts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Locating,
    Parsing,
    Composing,
    Delivering,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Locating => "locating",
            PipelineState::Parsing => "parsing",
            PipelineState::Composing => "composing",
            PipelineState::Delivering => "delivering",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Successful end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The log directory held no files.
    NothingToDo { log_dir: std::path::PathBuf },
    Completed {
        log_file: LogFile,
        facts: ParsedUpdateFacts,
        report: Report,
        delivery: DeliveryStatus,
    },
}

type LocatedHook<'a> = Box<dyn Fn(&LogFile) + Send + Sync + 'a>;

/// One run over one configuration. Holds borrowed capabilities; owns nothing
/// beyond its current state.
pub struct Pipeline<'a, S: ?Sized, T: ?Sized> {
    config: &'a PipelineConfig,
    summarizer: &'a S,
    transport: &'a T,
    state: PipelineState,
    on_located: Option<LocatedHook<'a>>,
}

impl<'a, S, T> Pipeline<'a, S, T>
where
    S: Summarizer + ?Sized,
    T: MailTransport + ?Sized,
{
    pub fn new(config: &'a PipelineConfig, summarizer: &'a S, transport: &'a T) -> Self {
        Self {
            config,
            summarizer,
            transport,
            state: PipelineState::Idle,
            on_located: None,
        }
    }

    /// Call `hook` with the selected log as soon as it is known, before any
    /// later stage can fail.
    #[must_use]
    pub fn on_located(mut self, hook: impl Fn(&LogFile) + Send + Sync + 'a) -> Self {
        self.on_located = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, to: PipelineState) {
        info!(from = %self.state, to = %to, "Pipeline state transition");
        self.state = to;
    }

    fn fail(&mut self, e: PipelineError) -> PipelineError {
        error!(stage = %self.state, error = %e, "Pipeline failed");
        self.transition(PipelineState::Failed);
        e
    }

    /// Run every stage once. Calling `run` again on a finished pipeline
    /// starts over from `Idle`.
    pub async fn run(&mut self) -> Result<PipelineOutcome, PipelineError> {
        self.state = PipelineState::Idle;
        let timeout = self.config.timeout;

        self.transition(PipelineState::Locating);
        let log_file = match locate(self.config) {
            Ok(LocateOutcome::Found(file)) => file,
            Ok(LocateOutcome::NoLogsAvailable(log_dir)) => {
                info!(log_dir = %log_dir.display(), "Nothing to do");
                self.transition(PipelineState::Done);
                return Ok(PipelineOutcome::NothingToDo { log_dir });
            }
            Err(e) => return Err(self.fail(e)),
        };
        if let Some(hook) = &self.on_located {
            hook(&log_file);
        }

        self.transition(PipelineState::Parsing);
        let raw = match read_log(&log_file.path) {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e)),
        };
        let facts = parse(&raw);

        self.transition(PipelineState::Composing);
        let composed = with_timeout(
            Stage::Summarize,
            timeout,
            compose(&facts, self.summarizer, self.config.locale),
        )
        .await;
        let report = match composed {
            Ok(report) => report,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(PipelineState::Delivering);
        let delivered = with_timeout(
            Stage::Deliver,
            timeout,
            deliver(&report, &self.config.smtp, self.transport, self.config.dry_run),
        )
        .await;
        let delivery = match delivered {
            Ok(status) => status,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(PipelineState::Done);
        Ok(PipelineOutcome::Completed {
            log_file,
            facts,
            report,
            delivery,
        })
    }
}

async fn with_timeout<F, V>(stage: Stage, limit: Duration, fut: F) -> Result<V, PipelineError>
where
    F: Future<Output = Result<V, PipelineError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            error!(%stage, timeout = ?limit, "External call timed out");
            Err(PipelineError::Timeout {
                stage,
                after: limit,
            })
        }
    }
}

/// Build a [`Pipeline`] and run it once.
pub async fn run_pipeline<S, T>(
    config: &PipelineConfig,
    summarizer: &S,
    transport: &T,
) -> Result<PipelineOutcome, PipelineError>
where
    S: Summarizer + ?Sized,
    T: MailTransport + ?Sized,
{
    Pipeline::new(config, summarizer, transport).run().await
}
