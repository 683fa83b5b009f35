//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Hand accepted download items over to external download daemons.
///
/// Handover reads a daemon config file and a task file (run mode plus
/// accepted entries) and submits each entry to every configured output:
/// aria2 over XML-RPC, cloud-torrent over HTTP.
#[derive(Parser, Debug)]
#[command(name = "handover")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to the daemon config file (JSON with "aria2" and/or "cloudtorrent" sections)
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// Path to the task file (JSON with "mode" and "accepted" entries)
    #[arg(short = 't', long)]
    pub task: PathBuf,

    /// Run in learn mode: build nothing, submit nothing
    #[arg(long, conflicts_with = "test")]
    pub learn: bool,

    /// Run in test mode: clients that honor it log entries instead of submitting
    #[arg(long)]
    pub test: bool,
}
