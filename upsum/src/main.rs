use clap::Parser;
use tracing_subscriber::EnvFilter;
use upsum::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Load environment; variables already set in the process win.
    dotenvy::dotenv().ok();

    // Logs go to stderr and stay silent unless RUST_LOG asks for them, so a
    // failed run shows only the single `Error:` line.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    match run(cli).await {
        Ok(()) => tracing::info!("CLI completed successfully"),
        Err(e) => {
            tracing::error!(error = %e, "CLI exited with error");
            println!("Error: {e}");
            std::process::exit(1);
        }
    }
}
