//! aria2 XML-RPC output client.
//!
//! Speaks to `http://[user:pass@]server:port/rpc`, adding torrent-file
//! entries via `aria2.addTorrent` and everything else (magnet, http, ftp)
//! via `aria2.addUri`. A configured secret is passed verbatim as the
//! leading call argument, the position aria2's token convention expects.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use crate::config::{Aria2Config, OptionValue};
use crate::entry::{Entry, download_dir, read_torrent_bytes};

use super::xmlrpc::{self, Value};
use super::{DownloadClient, SubmitError, SubmitReceipt, daemon_base_url};

/// Per-task-run handle to an aria2 daemon.
#[derive(Debug)]
pub struct Aria2Client {
    http: reqwest::Client,
    endpoint: String,
    secret: String,
    path_template: String,
    options: BTreeMap<String, OptionValue>,
}

impl Aria2Client {
    /// Builds the daemon handle and probes it with `aria2.getVersion` so
    /// an unreachable or refusing daemon fails the run before any entry is
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::CannotConnect`] with the classified cause
    /// (protocol, fault, socket, or unclassified) for any connect-time
    /// failure.
    pub async fn connect(config: &Aria2Config) -> Result<Self, SubmitError> {
        let base = daemon_base_url(
            &config.server,
            config.port,
            &config.username,
            &config.password,
        )
        .map_err(|e| {
            let address = format!("{}:{}", config.server, config.port);
            e.into_connect_failure(&address)
        })?;
        let endpoint = format!("{base}/rpc");
        debug!(url = %endpoint, "aria2 url");

        let client = Self {
            http: reqwest::Client::new(),
            endpoint,
            secret: config.secret.clone(),
            path_template: config.path.clone(),
            options: config.options.clone(),
        };

        let mut params = Vec::new();
        if let Some(token) = client.token_param() {
            params.push(token);
        }
        match client.call_raw("aria2.getVersion", params).await {
            Ok(body) => {
                // A real daemon answers getVersion with a struct; the
                // version member is what's worth logging.
                let version = xmlrpc::struct_member(&body, "version")
                    .or_else(|| xmlrpc::parse_response(&body).ok().filter(|v| !v.is_empty()))
                    .unwrap_or_else(|| "unknown".to_string());
                info!(url = %client.endpoint, version = %version, "Connected to daemon");
                Ok(client)
            }
            Err(err) => {
                debug!(error = %err, "aria2 connection probe failed");
                let endpoint = client.endpoint.clone();
                Err(err.into_connect_failure(&endpoint))
            }
        }
    }

    /// The configured secret as a leading call parameter, omitted entirely
    /// when empty (never passed as an empty string).
    fn token_param(&self) -> Option<Value> {
        if self.secret.is_empty() {
            None
        } else {
            Some(Value::Text(self.secret.clone()))
        }
    }

    /// Copies the configured options and computes `dir` for this entry:
    /// home-expanded, template-rendered path with the trailing slash
    /// stripped.
    fn entry_options(&self, entry: &Entry) -> Result<BTreeMap<String, Value>, SubmitError> {
        let mut options: BTreeMap<String, Value> = self
            .options
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    OptionValue::Integer(n) => Value::Integer(*n),
                    OptionValue::Text(s) => Value::Text(s.clone()),
                };
                (key.clone(), value)
            })
            .collect();
        let rendered = entry.render(&self.path_template)?;
        options.insert("dir".to_string(), Value::Text(download_dir(&rendered)));
        Ok(options)
    }

    /// Issues one XML-RPC call and returns the raw response body after
    /// transport, status, and fault checks.
    async fn call_raw(&self, method: &str, params: Vec<Value>) -> Result<String, SubmitError> {
        let body = xmlrpc::method_call(method, &params);
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| SubmitError::from_transport(&self.endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Protocol {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }
        let text = response
            .text()
            .await
            .map_err(|e| SubmitError::from_transport(&self.endpoint, &e))?;
        xmlrpc::check_fault(&text)?;
        Ok(text)
    }

    /// Issues one XML-RPC call expecting a scalar acknowledgement (the
    /// add-call GID shape).
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<String, SubmitError> {
        let text = self.call_raw(method, params).await?;
        xmlrpc::parse_response(&text)
    }
}

#[async_trait]
impl DownloadClient for Aria2Client {
    fn name(&self) -> &'static str {
        "aria2"
    }

    async fn submit(&self, entry: &Entry) -> Result<SubmitReceipt, SubmitError> {
        // dir is rendered before branching so a bad template surfaces the
        // same way for torrent and URI entries.
        let options = self.entry_options(entry)?;

        if let Some(file) = &entry.torrent_file {
            let bytes = read_torrent_bytes(file).map_err(|source| SubmitError::TorrentRead {
                path: file.clone(),
                source,
            })?;
            let mut params = Vec::new();
            if let Some(token) = self.token_param() {
                params.push(token);
            }
            params.push(Value::Binary(bytes));
            // aria2.addTorrent takes the raw torrent body; the configured
            // options map is not passed on this path.
            let gid = self.call("aria2.addTorrent", params).await?;
            debug!(title = %entry.title, gid = %gid, "added torrent to aria2");
            return Ok(SubmitReceipt::with_job_id(gid));
        }

        let mut params = Vec::new();
        if let Some(token) = self.token_param() {
            params.push(token);
        }
        params.push(Value::Array(vec![Value::Text(entry.url.clone())]));
        params.push(Value::Struct(options));
        let gid = self.call("aria2.addUri", params).await?;
        debug!(title = %entry.title, gid = %gid, "added uri to aria2");
        Ok(SubmitReceipt::with_job_id(gid))
    }
}
