//! CLI entry point for fetchfile.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fetchfile_core::{
    ClientConfig, DownloadEvent, DownloadRequest, Downloader, FileConfig, LoadedConfig,
    VerbositySetting, load_config_file, load_default_file_config,
};
use tracing::{debug, error, info};

mod cli;
mod output;

use cli::Args;
use output::EventSink;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = load_file_config(&args)?;
    let file_config = loaded.config.as_ref();

    // Priority: RUST_LOG env var > CLI flags > config file verbosity > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_level(&args, file_config)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");
    debug!(
        path = ?loaded.path,
        from_file = loaded.loaded_from_file(),
        verbosity = ?file_config.and_then(|cfg| cfg.verbosity).map(VerbositySetting::as_str),
        "configuration resolved"
    );

    let client_config = build_client_config(&args, file_config);
    let downloader =
        Downloader::new(&client_config).context("Failed to initialise the downloader")?;

    let request = DownloadRequest::new(args.url.clone(), args.save_path.clone());
    info!(id = %request.id(), url = %request.url(), path = %request.save_path().display(), "Downloading");

    let mut sink = EventSink::new(args.json, !args.no_progress && !args.quiet);
    let mut handle = downloader.start(request);

    while let Some(event) = handle.next_event().await {
        sink.handle(&event)
            .context("Failed to encode event as JSON")?;

        if let DownloadEvent::Finished { outcome, .. } = event {
            return Ok(match outcome.into_result() {
                Ok(path) => {
                    info!(path = %path.display(), "Download complete");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(kind = %e.kind(), "{e}");
                    ExitCode::FAILURE
                }
            });
        }
    }

    error!("download task ended without reporting an outcome");
    Ok(ExitCode::FAILURE)
}

fn load_file_config(args: &Args) -> Result<LoadedConfig> {
    if let Some(path) = &args.config {
        let config = load_config_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?;
        return Ok(LoadedConfig {
            path: Some(path.clone()),
            config: Some(config),
        });
    }
    load_default_file_config().context("Failed to load default config file")
}

fn default_log_level(args: &Args, file_config: Option<&FileConfig>) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => {}
        1 => return "debug",
        _ => return "trace",
    }
    match file_config.and_then(|cfg| cfg.verbosity) {
        Some(VerbositySetting::Quiet) => "error",
        Some(VerbositySetting::Verbose) => "debug",
        Some(VerbositySetting::Debug) => "trace",
        Some(VerbositySetting::Default) | None => "info",
    }
}

/// Defaults, then config file values, then command-line flags.
fn build_client_config(args: &Args, file_config: Option<&FileConfig>) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(file_config) = file_config {
        file_config.apply_to(&mut config);
    }
    if let Some(secs) = args.connect_timeout {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.read_timeout {
        config.read_timeout = Duration::from_secs(secs);
    }
    if let Some(user_agent) = &args.user_agent {
        config.user_agent.clone_from(user_agent);
    }
    config
}
