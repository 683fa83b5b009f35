//! Typed configuration records for the output clients.
//!
//! Each daemon client gets its own config struct with defaults applied
//! during deserialization, so a partially-specified config is complete
//! before any connection is attempted. Unknown keys are rejected to match
//! the strict schemas the host framework validates against.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

fn default_server() -> String {
    "localhost".to_string()
}

fn default_aria2_port() -> u16 {
    6800
}

fn default_cloudtorrent_port() -> u16 {
    3000
}

/// A value in the open aria2 options map.
///
/// aria2 accepts both strings and integers for its per-download options
/// (e.g. `split: 4`, `max-connection-per-server: "8"`). The distinction is
/// preserved end-to-end so the XML-RPC call serializes each value with its
/// original type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Integer-typed option value.
    Integer(i64),
    /// String-typed option value.
    Text(String),
}

impl OptionValue {
    /// Returns the string form if this value is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Configuration for the aria2 XML-RPC output.
///
/// Only `path` is required; everything else falls back to the daemon's
/// stock defaults. The config is immutable once deserialized — the per-item
/// `dir` option is computed into a *copy* of `options`, never written back.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Aria2Config {
    /// Daemon host name or address.
    #[serde(default = "default_server")]
    pub server: String,
    /// XML-RPC port (aria2 default).
    #[serde(default = "default_aria2_port")]
    pub port: u16,
    /// RPC authorization token, passed verbatim as the leading call
    /// argument when non-empty. aria2 expects the `token:<secret>` form,
    /// so configure it with the prefix included.
    #[serde(default)]
    pub secret: String,
    /// Basic-auth user embedded in the daemon URL. Deprecated by aria2 in
    /// favor of `secret`.
    #[serde(default)]
    pub username: String,
    /// Basic-auth password embedded in the daemon URL.
    #[serde(default)]
    pub password: String,
    /// Download directory, `~`-expandable and rendered per item with
    /// `{{field}}` expressions.
    pub path: String,
    /// Extra aria2 options merged into every add call.
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
}

/// Configuration for the cloud-torrent HTTP output.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudTorrentConfig {
    /// Daemon host name or address.
    #[serde(default = "default_server")]
    pub server: String,
    /// HTTP API port (cloud-torrent default).
    #[serde(default = "default_cloudtorrent_port")]
    pub port: u16,
    /// Basic-auth user embedded in the daemon URL.
    #[serde(default)]
    pub username: String,
    /// Basic-auth password embedded in the daemon URL.
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_aria2_config_applies_defaults_for_missing_fields() {
        let config: Aria2Config = serde_json::from_str(r#"{"path": "~/downloads"}"#).unwrap();
        assert_eq!(config.server, "localhost");
        assert_eq!(config.port, 6800);
        assert_eq!(config.secret, "");
        assert_eq!(config.username, "");
        assert_eq!(config.password, "");
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_aria2_config_requires_path() {
        let result = serde_json::from_str::<Aria2Config>(r#"{"server": "seedbox"}"#);
        assert!(result.is_err(), "path is required");
    }

    #[test]
    fn test_aria2_config_rejects_unknown_keys() {
        let result =
            serde_json::from_str::<Aria2Config>(r#"{"path": "~/dl", "bogus": true}"#);
        assert!(result.is_err(), "unknown keys must be rejected");
    }

    #[test]
    fn test_aria2_options_preserve_value_types() {
        let config: Aria2Config = serde_json::from_str(
            r#"{"path": "~/dl", "options": {"split": 4, "ftp-user": "anon"}}"#,
        )
        .unwrap();
        assert_eq!(config.options["split"], OptionValue::Integer(4));
        assert_eq!(config.options["ftp-user"], OptionValue::from("anon"));
    }

    #[test]
    fn test_cloudtorrent_config_applies_defaults_for_missing_fields() {
        let config: CloudTorrentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server, "localhost");
        assert_eq!(config.port, 3000);
        assert_eq!(config.username, "");
        assert_eq!(config.password, "");
    }

    #[test]
    fn test_cloudtorrent_config_rejects_unknown_keys() {
        let result = serde_json::from_str::<CloudTorrentConfig>(r#"{"secret": "nope"}"#);
        assert!(result.is_err(), "cloud-torrent has no secret key");
    }

    #[test]
    fn test_option_value_display_matches_source_type() {
        assert_eq!(OptionValue::Integer(16).to_string(), "16");
        assert_eq!(OptionValue::from("true").to_string(), "true");
    }
}
