//! Error kinds for resource acquisition and file transfer.
//!
//! Startup failures (socket setup, the served-file check) are fatal and bubble
//! up through `main`; everything else is recoverable at connection scope and
//! is logged where it is handled.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while acquiring an OS resource (listening socket or served file).
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to create listening socket: {source}")]
    Socket { source: io::Error },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("failed to listen on {addr}: {source}")]
    Listen { addr: SocketAddr, source: io::Error },

    #[error("failed to accept connection: {source}")]
    Accept { source: io::Error },

    #[error("cannot open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read metadata of {path}: {source}")]
    Metadata { path: PathBuf, source: io::Error },

    #[error("{path} is not a regular file")]
    NotAFile { path: PathBuf },
}

impl ResourceError {
    /// The OS error code behind this failure, when there is one.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Self::Socket { source }
            | Self::Bind { source, .. }
            | Self::Listen { source, .. }
            | Self::Accept { source }
            | Self::Open { source, .. }
            | Self::Metadata { source, .. } => source.raw_os_error(),
            Self::NotAFile { .. } => None,
        }
    }
}

/// Failures inside the zero-copy transfer loop.
///
/// Peer disconnects are *not* errors (the loop reports them as a short but
/// clean transfer); these variants cover the cases where the connection has to
/// be abandoned.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The socket stayed unwritable through the whole stall budget.
    #[error("transfer stalled after {bytes_sent} bytes ({stalls} waits without progress)")]
    Stalled { bytes_sent: u64, stalls: u32 },

    /// Any sendfile failure other than the transient and peer-gone conditions.
    #[error("sendfile failed after {bytes_sent} bytes: {source}")]
    Io { bytes_sent: u64, source: io::Error },
}
