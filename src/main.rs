//! CLI entry point for the handover tool.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use handover_core::{RunMode, RunReport, TaskContext, run_aria2, run_cloudtorrent};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

mod cli;

use cli::Args;

/// Top-level config file: one optional section per output.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputsConfig {
    aria2: Option<handover_core::Aria2Config>,
    cloudtorrent: Option<handover_core::CloudTorrentConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config: OutputsConfig = load_json(&args.config).context("failed to load config file")?;
    if config.aria2.is_none() && config.cloudtorrent.is_none() {
        bail!("config file configures no outputs (expected an `aria2` or `cloudtorrent` section)");
    }

    let mut task: TaskContext = load_json(&args.task).context("failed to load task file")?;
    if args.learn {
        task.mode = RunMode::Learn;
    } else if args.test {
        task.mode = RunMode::Test;
    }

    info!(
        entries = task.accepted.len(),
        mode = ?task.mode,
        "Handover starting"
    );

    let mut aborted = false;

    if let Some(aria2) = &config.aria2 {
        match run_aria2(aria2, &task).await {
            Ok(report) => summarize("aria2", &report),
            Err(err) => {
                error!(error = %err, "aria2 output aborted");
                aborted = true;
            }
        }
    }

    if let Some(cloudtorrent) = &config.cloudtorrent {
        match run_cloudtorrent(cloudtorrent, &task).await {
            Ok(report) => summarize("cloudtorrent", &report),
            Err(err) => {
                error!(error = %err, "cloud-torrent output aborted");
                aborted = true;
            }
        }
    }

    if aborted {
        bail!("one or more outputs aborted");
    }
    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("cannot parse {}", path.display()))
}

fn summarize(output: &str, report: &RunReport) {
    info!(
        output,
        submitted = report.submitted.len(),
        failed = report.failed.len(),
        skipped = report.skipped,
        "Output finished"
    );
    for failure in &report.failed {
        warn!(output, title = %failure.title, reason = %failure.reason, "entry failed");
    }
}
