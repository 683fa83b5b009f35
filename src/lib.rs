//! Handover Core Library
//!
//! This library submits batches of accepted download items to external
//! download daemons at the end of a host scheduler's processing cycle:
//! aria2 over its XML-RPC control interface and cloud-torrent over its
//! plain HTTP API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Typed per-daemon configuration with defaults
//! - [`entry`] - Accepted items, run modes, and path template rendering
//! - [`client`] - Daemon clients behind the [`client::DownloadClient`] seam
//! - [`output`] - The sequential batch driver and its run report

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod entry;
pub mod output;

// Re-export commonly used types
pub use client::{
    Aria2Client, CloudTorrentClient, ConnectCause, DownloadClient, SubmitError, SubmitReceipt,
};
pub use config::{Aria2Config, CloudTorrentConfig, OptionValue};
pub use entry::{Entry, RenderError, RunMode, TaskContext};
pub use output::{EntryFailure, RunReport, SubmissionRecord, drive, run_aria2, run_cloudtorrent};
