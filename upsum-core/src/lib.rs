#![doc = "upsum-core: the update-log report pipeline."]

//! This crate holds every stage of the pipeline and the contracts for its two
//! external collaborators. Network clients live in the `upsum` binary crate.
//!
//! # Usage
//! Build a [`config::PipelineConfig`], supply a [`contract::Summarizer`] and a
//! [`contract::MailTransport`], and call [`pipeline::run_pipeline`].

pub mod compose;
pub mod config;
pub mod contract;
pub mod deliver;
pub mod error;
pub mod locate;
pub mod parse;
pub mod pipeline;

pub use error::{ConfigError, PipelineError};
pub use pipeline::{run_pipeline, Pipeline, PipelineOutcome, PipelineState};
