//! cloud-torrent HTTP output client.
//!
//! A reusable session bound to `http://[user:pass@]server:port`; every
//! accepted entry becomes one `POST {base}/api/magnet` with the raw URL as
//! the request body. The server's textual response is logged verbatim and
//! carried in the receipt; non-2xx answers are reported, not raised.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::CloudTorrentConfig;
use crate::entry::Entry;

use super::{DownloadClient, SubmitError, SubmitReceipt, daemon_base_url};

/// Per-task-run handle to a cloud-torrent daemon.
pub struct CloudTorrentClient {
    http: reqwest::Client,
    base_url: String,
}

impl CloudTorrentClient {
    /// Builds the session handle. No probe is issued; the daemon is first
    /// contacted when an entry is submitted.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::CannotConnect`] when the configured address
    /// cannot form a session URL.
    pub fn connect(config: &CloudTorrentConfig) -> Result<Self, SubmitError> {
        let base_url = daemon_base_url(
            &config.server,
            config.port,
            &config.username,
            &config.password,
        )
        .map_err(|e| {
            let address = format!("{}:{}", config.server, config.port);
            e.into_connect_failure(&address)
        })?;
        debug!(url = %base_url, "cloudtorrent url");
        info!(url = %base_url, "Connecting to cloud-torrent");
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// The session's base URL, exposed so callers can see where magnets go.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DownloadClient for CloudTorrentClient {
    fn name(&self) -> &'static str {
        "cloudtorrent"
    }

    fn honors_test_mode(&self) -> bool {
        true
    }

    async fn submit(&self, entry: &Entry) -> Result<SubmitReceipt, SubmitError> {
        let endpoint = format!("{}/api/magnet", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .body(entry.url.clone())
            .send()
            .await
            .map_err(|e| SubmitError::from_transport(&endpoint, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SubmitError::from_transport(&endpoint, &e))?;
        info!(
            url = %entry.url,
            status = status.as_u16(),
            response = %text,
            "Sent entry to cloud-torrent"
        );
        Ok(SubmitReceipt::with_response(text))
    }
}
