//! Batch driver for the output stage.
//!
//! One run per task execution: skip entirely in learn mode, build one
//! daemon handle, submit accepted entries sequentially, and collect
//! per-entry outcomes into a [`RunReport`] the host forwards to its own
//! reporting. Socket-class failures fail the single entry and the batch
//! continues; anything else aborts the remainder of the run.

use tracing::{debug, info};

use crate::client::{Aria2Client, CloudTorrentClient, DownloadClient, SubmitError, SubmitReceipt};
use crate::config::{Aria2Config, CloudTorrentConfig};
use crate::entry::{RunMode, TaskContext};

/// A per-entry failure the host reports against that entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Title of the failed entry.
    pub title: String,
    /// Human-readable reason.
    pub reason: String,
}

/// A successfully acknowledged submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Title of the submitted entry.
    pub title: String,
    /// The daemon's acknowledgement.
    pub receipt: SubmitReceipt,
}

/// Outcome of one output run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Entries the daemon acknowledged, in submission order.
    pub submitted: Vec<SubmissionRecord>,
    /// Entries that failed individually (socket-class errors only).
    pub failed: Vec<EntryFailure>,
    /// Entries skipped without a network call (test mode).
    pub skipped: usize,
}

impl RunReport {
    /// True when the run touched nothing (learn mode, or an empty batch).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.submitted.is_empty() && self.failed.is_empty() && self.skipped == 0
    }
}

/// Runs the aria2 output for one task execution.
///
/// # Errors
///
/// [`SubmitError::CannotConnect`] when the daemon is unreachable at connect
/// time; any non-socket submission error aborts the remaining batch.
pub async fn run_aria2(config: &Aria2Config, task: &TaskContext) -> Result<RunReport, SubmitError> {
    if task.mode == RunMode::Learn {
        debug!("learn mode; aria2 output skipped");
        return Ok(RunReport::default());
    }
    let client = Aria2Client::connect(config).await?;
    drive(&client, task).await
}

/// Runs the cloud-torrent output for one task execution.
///
/// # Errors
///
/// Same contract as [`run_aria2`]; additionally honors test mode by logging
/// each entry instead of submitting it.
pub async fn run_cloudtorrent(
    config: &CloudTorrentConfig,
    task: &TaskContext,
) -> Result<RunReport, SubmitError> {
    if task.mode == RunMode::Learn {
        debug!("learn mode; cloud-torrent output skipped");
        return Ok(RunReport::default());
    }
    let client = CloudTorrentClient::connect(config)?;
    drive(&client, task).await
}

/// Submits every accepted entry through `client`, strictly in host order,
/// one outstanding call at a time.
///
/// # Errors
///
/// Propagates the first non-socket [`SubmitError`], aborting the remainder
/// of the batch. Socket-class errors are recorded per entry instead.
pub async fn drive(
    client: &dyn DownloadClient,
    task: &TaskContext,
) -> Result<RunReport, SubmitError> {
    let mut report = RunReport::default();
    for entry in &task.accepted {
        if task.mode == RunMode::Test && client.honors_test_mode() {
            info!(
                client = client.name(),
                title = %entry.title,
                url = %entry.url,
                "Would add entry"
            );
            report.skipped += 1;
            continue;
        }
        match client.submit(entry).await {
            Ok(receipt) => {
                report.submitted.push(SubmissionRecord {
                    title: entry.title.clone(),
                    receipt,
                });
            }
            Err(err) if err.is_socket() => {
                let reason = format!("Unable to reach {}: {err}", client.name());
                debug!(title = %entry.title, reason = %reason, "entry failed");
                report.failed.push(EntryFailure {
                    title: entry.title.clone(),
                    reason,
                });
            }
            Err(err) => {
                debug!(
                    client = client.name(),
                    title = %entry.title,
                    error = %err,
                    "unexpected error during submission; aborting batch"
                );
                return Err(err);
            }
        }
    }
    Ok(report)
}
