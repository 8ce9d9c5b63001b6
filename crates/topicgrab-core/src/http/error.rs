//! Fetch error type and its classification for log lines.

use std::fmt;
use thiserror::Error;

/// Failure of a single GET (page or image).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (DNS, timeout, connection reset, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Final response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The body sink failed (disk full, permission denied, ...).
    #[error("write failed: {0}")]
    Sink(#[source] std::io::Error),
}

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection,
    Status(u32),
    Write,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Connection => write!(f, "connection"),
            FailureKind::Status(code) => write!(f, "status {}", code),
            FailureKind::Write => write!(f, "write"),
            FailureKind::Other => write!(f, "other"),
        }
    }
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport(e) => classify_curl_error(e),
            FetchError::Http(code) => FailureKind::Status(*code),
            FetchError::Sink(_) => FailureKind::Write,
        }
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}
