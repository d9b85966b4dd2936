//! Error types for netlink decoding and monitoring.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while receiving, decoding or reporting events.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations or an output sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Message or fixed header was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected length.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// The consumer side of an event channel went away.
    #[error("event channel closed")]
    ChannelClosed,
}

impl Error {
    /// Get the OS errno if this wraps an I/O error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }

    /// Check if this is a would-block or interrupted I/O error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Check if the transport is gone for good (EBADF, ENOTSOCK).
    ///
    /// Every other receive failure is retried by the monitor.
    pub fn is_fatal_io(&self) -> bool {
        matches!(self.errno(), Some(libc::EBADF) | Some(libc::ENOTSOCK))
    }

    /// Check if this is a decode error (truncated or invalid input).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. } | Self::InvalidMessage(_) | Self::InvalidAttribute(_)
        )
    }
}
