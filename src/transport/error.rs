//! Transport error types.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::error::ProtocolError;

/// A socket-level failure. The connection is unusable afterwards.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind:?} ({message})")]
pub struct TransportError {
    /// Category of the failure.
    pub kind: io::ErrorKind,
    /// Platform error code, when the OS reported one.
    pub code: Option<i32>,
    /// Human-readable description.
    pub message: String,
}

impl TransportError {
    pub(crate) fn not_connected() -> Self {
        Self {
            kind: io::ErrorKind::NotConnected,
            code: None,
            message: "transport is not started".to_string(),
        }
    }

    pub(crate) fn timed_out(limit: Duration) -> Self {
        Self {
            kind: io::ErrorKind::TimedOut,
            code: None,
            message: format!("connect did not complete within {:?}", limit),
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self {
            kind: err.kind(),
            code: err.raw_os_error(),
            message: err.to_string(),
        }
    }
}

impl From<ProtocolError> for TransportError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(err) => err.into(),
            other => Self {
                kind: io::ErrorKind::InvalidData,
                code: None,
                message: other.to_string(),
            },
        }
    }
}
