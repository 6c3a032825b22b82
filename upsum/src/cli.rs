//! This module implements the CLI interface for upsum: argument parsing, wiring the
//! concrete Gemini and SMTP clients into the core pipeline, and user-visible output.
//!
//! All pipeline logic (locating, parsing, prompting, rendering) lives in [`upsum_core`].
//! This module is strictly CLI glue.
//!
//! ## How To Use
//! - For command-line users: run the installed `upsum` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use upsum_core::deliver::DeliveryStatus;
use upsum_core::{Pipeline, PipelineOutcome};

use crate::gemini::GeminiClient;
use crate::load_config::{load_api_key, load_config, RunOptions};
use crate::mailer::SmtpMailer;

/// Summarize system update logs and send the report by email.
#[derive(Parser, Debug)]
#[clap(
    name = "upsum",
    version,
    about = "Summarize system update logs with Gemini and send the report by email"
)]
pub struct Cli {
    /// Directory where update log files are stored
    #[clap(long, default_value = "~/logs")]
    pub log_dir: PathBuf,

    /// Print the summary to the console instead of sending email
    #[clap(long)]
    pub dry_run: bool,

    /// Specific log file to process, bypassing the directory search
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// List Gemini models that support content generation, then exit
    #[clap(long)]
    pub list_models: bool,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    if cli.list_models {
        return list_models().await;
    }

    let config = load_config(RunOptions {
        log_dir: cli.log_dir,
        log_file: cli.log_file,
        dry_run: cli.dry_run,
    })?;

    let summarizer = GeminiClient::new(
        config.api_key.clone(),
        config.model.clone(),
        config.client_timeout(),
    )?;
    let mailer = SmtpMailer::new(&config.smtp, config.client_timeout())?;

    tracing::info!(dry_run = config.dry_run, "Starting update report pipeline");
    let outcome = Pipeline::new(&config, &summarizer, &mailer)
        .on_located(|log_file| println!("Processing log file: {}", log_file.path.display()))
        .run()
        .await?;
    match outcome {
        PipelineOutcome::NothingToDo { log_dir } => {
            println!("No log files found in {}. Nothing to do.", log_dir.display());
        }
        PipelineOutcome::Completed { report, delivery, .. } => {
            println!("--- Generated Summary ---");
            println!("{}", report.body);
            println!("-------------------------");
            match delivery {
                DeliveryStatus::Skipped => println!("Dry run enabled. No email will be sent."),
                DeliveryStatus::Delivered => {
                    println!("Email sent successfully to {}.", config.smtp.to)
                }
            }
        }
    }
    Ok(())
}

async fn list_models() -> Result<()> {
    let api_key = load_api_key()?;
    let model = std::env::var("GEMINI_MODEL")
        .unwrap_or_else(|_| upsum_core::config::DEFAULT_MODEL.to_string());
    let client = GeminiClient::new(api_key, model, upsum_core::config::DEFAULT_TIMEOUT)?;
    let models = client.list_models().await?;
    println!("Models supporting generateContent:");
    for name in models {
        println!("- {name}");
    }
    Ok(())
}
