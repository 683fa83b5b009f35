//! Accepted work items and the host-task surface the outputs consume.
//!
//! The host scheduler owns entries; the output clients only read them and
//! report per-entry outcomes back as values. Template rendering for
//! configured paths lives here because it draws exclusively on entry
//! fields.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// `{{field}}` expression, with optional inner whitespace.
#[allow(clippy::expect_used)]
static TEMPLATE_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("template regex is valid") // Static pattern, safe to panic
});

/// Execution mode of the surrounding task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Submit every accepted entry.
    #[default]
    Normal,
    /// Dry run: no connection is built, no entry is touched.
    Learn,
    /// Connection is built, but clients that honor this mode log what they
    /// would submit instead of calling the daemon.
    Test,
}

/// A unit of work accepted by the host for output-stage processing.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    /// Human-readable name, used in logs and failure reports.
    pub title: String,
    /// Download URI (magnet, http, ftp, ...).
    pub url: String,
    /// Local torrent file backing this entry, when it represents a torrent
    /// file rather than a URI.
    #[serde(default)]
    pub torrent_file: Option<PathBuf>,
    /// Free-form fields available to path template rendering.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Entry {
    /// Creates an entry for a plain URI.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            torrent_file: None,
            fields: BTreeMap::new(),
        }
    }

    /// Marks this entry as backed by a local torrent file.
    #[must_use]
    pub fn with_torrent_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.torrent_file = Some(path.into());
        self
    }

    /// Adds a template-visible field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// True when this entry should go through the torrent-file add path.
    #[must_use]
    pub fn is_torrent(&self) -> bool {
        self.torrent_file.is_some()
    }

    /// Renders `{{field}}` expressions in `template` from this entry's
    /// fields. The entry's `title` and `url` are always available.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the template references a field this
    /// entry does not carry.
    pub fn render(&self, template: &str) -> Result<String, RenderError> {
        let mut missing = None;
        let rendered = TEMPLATE_EXPR.replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match self.field(name) {
                Some(value) => value.to_string(),
                None => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });
        match missing {
            Some(field) => Err(RenderError::UnknownField {
                field,
                template: template.to_string(),
            }),
            None => Ok(rendered.into_owned()),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "url" => Some(&self.url),
            _ => self.fields.get(name).map(String::as_str),
        }
    }
}

/// Template rendering failure for a configured path.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The template referenced a field the entry does not have.
    #[error("unknown field `{field}` in template `{template}`")]
    UnknownField {
        /// The missing field name.
        field: String,
        /// The template being rendered.
        template: String,
    },
}

/// The slice of a task run the output stage sees: mode plus accepted
/// entries, in host order.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskContext {
    /// Execution mode for this run.
    #[serde(default)]
    pub mode: RunMode,
    /// Entries accepted for output, in processing order.
    #[serde(default)]
    pub accepted: Vec<Entry>,
}

impl TaskContext {
    /// Creates a normal-mode task over the given entries.
    #[must_use]
    pub fn new(accepted: Vec<Entry>) -> Self {
        Self {
            mode: RunMode::Normal,
            accepted,
        }
    }

    /// Sets the run mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Expands a leading `~` or `~/` to the user's home directory.
///
/// Unknown-home environments fall back to the path unchanged, matching how
/// the daemon would then resolve it relative to its own cwd.
#[must_use]
pub fn expand_home(path: &str) -> String {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home.display().to_string();
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    path.to_string()
}

/// Expands and normalizes a rendered download directory: home expansion
/// plus trailing-slash strip (aria2 rejects `dir` values ending in `/`).
#[must_use]
pub fn download_dir(rendered_path: &str) -> String {
    let expanded = expand_home(rendered_path);
    expanded.trim_end_matches('/').to_string()
}

/// Reads the raw bytes of an entry's torrent file.
///
/// # Errors
///
/// Returns the underlying IO error; callers attach the path context.
pub fn read_torrent_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    std::fs::read(path)
}
