mod cli;
mod config;
mod context;
mod error;
mod paths;
mod prompt;
mod provider;

use anyhow::Context;
use clap::Parser;
use provider::OpenAiProvider;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match run(&args).await {
        Ok(answer) => {
            println!("{answer}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve settings, snapshot the working directory, and ask once.
async fn run(args: &cli::Args) -> anyhow::Result<String> {
    let cfg = config::ResolvedConfig::load(args)
        .inspect_err(log_failure)
        .context("Error loading configuration")?;
    tracing::debug!(?cfg, "resolved config");

    let snapshot = context::DirectorySnapshot::collect()
        .inspect_err(log_failure)
        .context("Error getting context")?;

    let req = prompt::build_request(&cfg.model, &snapshot, &args.question());

    let answer = ask(&cfg, &req)
        .await
        .inspect_err(log_failure)
        .context("Error querying LLM")?;
    Ok(answer)
}

async fn ask(cfg: &config::ResolvedConfig, req: &provider::ChatRequest) -> error::Result<String> {
    let http = OpenAiProvider::http_client(cfg)?;
    OpenAiProvider::new(http, cfg).ask(req).await
}

fn log_failure(err: &error::Error) {
    tracing::debug!(kind = ?err.kind(), error = %err, "stage failed");
}
