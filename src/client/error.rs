//! Error types for daemon submission.
//!
//! The connection boundary maps a closed set of known causes (protocol,
//! fault, socket) plus an explicit unclassified catch-all into one reported
//! type; unknown errors are never silently suppressed.

use std::path::PathBuf;

use thiserror::Error;

use crate::entry::RenderError;

/// Classified cause of a connect-time failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectCause {
    /// The daemon answered with an HTTP-level error.
    Protocol {
        /// HTTP status code returned by the endpoint.
        status: u16,
    },
    /// The daemon answered with an XML-RPC fault.
    Fault {
        /// Fault code from the response envelope.
        code: i64,
        /// Fault string from the response envelope.
        message: String,
    },
    /// The daemon could not be reached at the transport level.
    Socket {
        /// Human-readable transport error.
        message: String,
    },
    /// Anything else that went wrong while establishing the connection.
    Unclassified {
        /// Diagnostic detail preserved for logging.
        message: String,
    },
}

impl std::fmt::Display for ConnectCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protocol { status } => write!(f, "protocol error (HTTP {status})"),
            Self::Fault { code, message } => write!(f, "fault {code}: {message}"),
            Self::Socket { message } => write!(f, "socket error: {message}"),
            Self::Unclassified { message } => write!(f, "unidentified error: {message}"),
        }
    }
}

/// Errors raised while submitting entries to a download daemon.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The daemon was unreachable or rejected us at connect time. Fatal for
    /// the whole run; no entries are submitted.
    #[error("cannot connect to daemon at {url}: {cause}")]
    CannotConnect {
        /// The daemon URL that failed.
        url: String,
        /// Classified cause.
        cause: ConnectCause,
    },

    /// Transport-level failure during a single entry's submission. The
    /// driver marks the entry failed and continues with the batch.
    #[error("unable to reach daemon at {url}: {message}")]
    Socket {
        /// The endpoint that failed.
        url: String,
        /// Human-readable transport error.
        message: String,
    },

    /// The daemon rejected a single call with an XML-RPC fault.
    #[error("daemon fault {code}: {message}")]
    Fault {
        /// Fault code from the response envelope.
        code: i64,
        /// Fault string from the response envelope.
        message: String,
    },

    /// The daemon answered a call with an HTTP-level error.
    #[error("daemon returned HTTP {status} for {url}")]
    Protocol {
        /// The endpoint that answered.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The daemon's response could not be interpreted.
    #[error("malformed daemon response: {detail}")]
    MalformedResponse {
        /// What was wrong with the payload.
        detail: String,
    },

    /// Rendering the configured path against an entry failed.
    #[error("path template error: {0}")]
    Render(#[from] RenderError),

    /// The entry's torrent file could not be read.
    #[error("failed to read torrent file {path}: {source}")]
    TorrentRead {
        /// The file that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A daemon base URL could not be assembled from the configuration.
    #[error("invalid daemon address `{address}`: {detail}")]
    InvalidTarget {
        /// The offending host/port combination.
        address: String,
        /// Why it was rejected.
        detail: String,
    },
}

impl SubmitError {
    /// True for transport failures the batch driver recovers from by
    /// failing the single entry and moving on.
    #[must_use]
    pub fn is_socket(&self) -> bool {
        matches!(self, Self::Socket { .. })
    }

    /// Classifies a `reqwest` transport error against `url`.
    ///
    /// Connection, timeout, and body-transfer failures are socket-class;
    /// everything else (builder misuse, decode) stays distinct so it is
    /// surfaced rather than retried away.
    #[must_use]
    pub fn from_transport(url: impl Into<String>, source: &reqwest::Error) -> Self {
        let url = url.into();
        if source.is_connect() || source.is_timeout() || source.is_request() || source.is_body() {
            Self::Socket {
                url,
                message: source.to_string(),
            }
        } else {
            Self::MalformedResponse {
                detail: source.to_string(),
            }
        }
    }

    /// Re-expresses a per-call error as the fatal connect-time variant,
    /// preserving the classified cause.
    #[must_use]
    pub fn into_connect_failure(self, daemon_url: &str) -> Self {
        let cause = match self {
            Self::Socket { message, .. } => ConnectCause::Socket { message },
            Self::Fault { code, message } => ConnectCause::Fault { code, message },
            Self::Protocol { status, .. } => ConnectCause::Protocol { status },
            other => ConnectCause::Unclassified {
                message: other.to_string(),
            },
        };
        Self::CannotConnect {
            url: daemon_url.to_string(),
            cause,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_errors_are_recoverable_per_item() {
        let err = SubmitError::Socket {
            url: "http://localhost:6800/rpc".into(),
            message: "connection refused".into(),
        };
        assert!(err.is_socket());
    }

    #[test]
    fn test_faults_are_not_recoverable_per_item() {
        let err = SubmitError::Fault {
            code: 1,
            message: "Unauthorized".into(),
        };
        assert!(!err.is_socket());
    }

    #[test]
    fn test_into_connect_failure_preserves_fault_cause() {
        let err = SubmitError::Fault {
            code: 1,
            message: "Unauthorized".into(),
        }
        .into_connect_failure("http://localhost:6800/rpc");
        match err {
            SubmitError::CannotConnect { cause, .. } => {
                assert_eq!(
                    cause,
                    ConnectCause::Fault {
                        code: 1,
                        message: "Unauthorized".into()
                    }
                );
            }
            other => panic!("expected CannotConnect, got {other:?}"),
        }
    }

    #[test]
    fn test_into_connect_failure_wraps_unknown_causes_explicitly() {
        let err = SubmitError::MalformedResponse {
            detail: "garbage".into(),
        }
        .into_connect_failure("http://localhost:6800/rpc");
        match err {
            SubmitError::CannotConnect { cause, .. } => {
                assert!(matches!(cause, ConnectCause::Unclassified { .. }));
            }
            other => panic!("expected CannotConnect, got {other:?}"),
        }
    }
}
