//! Error taxonomy shared by the store, the scan service and the remote client.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("result not found: {identifier}")]
    NotFound { identifier: String },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed result file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("background task failed: {0}")]
    Task(String),

    #[error("cannot connect to server: {url}")]
    Connect { url: String },

    #[error("request timed out")]
    Timeout,

    #[error("remote request failed: {0}")]
    Remote(String),

    #[error("{0}")]
    Validation(String),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Coarse classification used for http status codes and cli exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Io,
    Transport,
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Io => "io_failure",
            ErrorKind::Transport => "transport_failure",
            ErrorKind::Validation => "validation_failure",
        }
    }
}

impl Error {
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Error::NotFound { identifier: identifier.into() }
    }

    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { action, path: path.into(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Io { .. }
            | Error::Malformed { .. }
            | Error::Encode(_)
            | Error::Bind { .. }
            | Error::Task(_) => ErrorKind::Io,
            Error::Connect { .. } | Error::Timeout | Error::Remote(_) => ErrorKind::Transport,
            Error::Validation(_) | Error::Config { .. } => ErrorKind::Validation,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Connect {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            Error::Remote(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(Error::not_found("abc").kind(), ErrorKind::NotFound);
        assert_eq!(Error::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(Error::Validation("bad".into()).kind(), ErrorKind::Validation);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::io("writing", "/tmp/x", io).kind(), ErrorKind::Io);
    }

    #[test]
    fn not_found_message_names_identifier() {
        let err = Error::not_found("deadbeef");
        assert_eq!(err.to_string(), "result not found: deadbeef");
    }
}
