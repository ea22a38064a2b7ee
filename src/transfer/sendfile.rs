use std::io;
use std::net::TcpStream;
use std::os::fd::{AsRawFd, RawFd};

use tracing::{debug, trace, warn};

use super::file::ServedFile;
use crate::error::TransferError;

/// Retry policy for a transfer: how long one wait for socket writability may
/// take, and how many such waits may expire back-to-back before the transfer
/// is abandoned. Any successful chunk resets the count.
#[derive(Debug, Clone, Copy)]
pub struct StallPolicy {
    pub timeout_ms: u64,
    pub max_stalls: u32,
}

/// Report of one finished transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Bytes handed to the kernel for this connection.
    pub bytes_sent: u64,
    /// Number of sendfile calls that moved data.
    pub chunks: u64,
    /// `true` when the full length cached at open was sent. `false` means the
    /// peer went away mid-transfer or the file shrank after open; neither is
    /// an error.
    pub complete: bool,
}

/// Streams `file` into `stream` with `sendfile(2)`, at most `chunk_size`
/// bytes per call.
///
/// The kernel advances the file offset itself, so no byte is ever staged in
/// user space or sent twice. The socket is switched to nonblocking for the
/// transfer: a peer that stops reading surfaces as `EAGAIN` instead of
/// parking the calling thread inside the kernel, and the stall policy meters
/// the resulting waits. The loop stops when the cached length has been sent,
/// when the peer disappears (`EPIPE`/`ECONNRESET`, reported as a short but
/// clean transfer), or when the stall policy runs out.
pub fn send_file(
    stream: &TcpStream,
    file: &ServedFile,
    chunk_size: usize,
    policy: StallPolicy,
) -> Result<Transfer, TransferError> {
    // On a blocking socket sendfile waits in the kernel for buffer space and
    // never reports EAGAIN, so the stall budget could not fire.
    stream
        .set_nonblocking(true)
        .map_err(|source| TransferError::Io {
            bytes_sent: 0,
            source,
        })?;

    let sock_fd = stream.as_raw_fd();
    let file_fd = file.raw_fd();
    let mut offset: libc::off_t = 0;
    let mut remaining = file.len();
    let mut chunks = 0u64;
    let mut stalls = 0u32;

    while remaining > 0 {
        let want = remaining.min(chunk_size as u64) as usize;
        // SAFETY: both descriptors belong to values borrowed for the whole
        // call, and `offset` is a valid stack slot the kernel advances by the
        // bytes it consumed.
        let sent = unsafe { libc::sendfile(sock_fd, file_fd, &mut offset, want) };

        if sent > 0 {
            remaining -= sent as u64;
            chunks += 1;
            stalls = 0;
            trace!(sent, remaining, "chunk transferred");
            continue;
        }

        if sent == 0 {
            // EOF before the length cached at open: the file shrank.
            warn!(
                missing = remaining,
                "served file ended before its recorded length"
            );
            return Ok(Transfer {
                bytes_sent: file.len() - remaining,
                chunks,
                complete: false,
            });
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINTR) => continue,
            Some(code) if code == libc::EAGAIN || code == libc::EWOULDBLOCK => {
                match wait_writable(sock_fd, policy.timeout_ms) {
                    Ok(true) => continue,
                    Ok(false) => {
                        stalls += 1;
                        if stalls >= policy.max_stalls {
                            return Err(TransferError::Stalled {
                                bytes_sent: file.len() - remaining,
                                stalls,
                            });
                        }
                    }
                    Err(source) => {
                        return Err(TransferError::Io {
                            bytes_sent: file.len() - remaining,
                            source,
                        });
                    }
                }
            }
            Some(libc::EPIPE) | Some(libc::ECONNRESET) => {
                debug!(missing = remaining, "peer went away mid-transfer");
                return Ok(Transfer {
                    bytes_sent: file.len() - remaining,
                    chunks,
                    complete: false,
                });
            }
            _ => {
                return Err(TransferError::Io {
                    bytes_sent: file.len() - remaining,
                    source: err,
                });
            }
        }
    }

    Ok(Transfer {
        bytes_sent: file.len(),
        chunks,
        complete: true,
    })
}

/// Blocks until `fd` is writable or `timeout_ms` expires. `Ok(true)` means a
/// retry is worthwhile (writable, or an error event the next sendfile call
/// will report); `Ok(false)` means the wait timed out.
fn wait_writable(fd: RawFd, timeout_ms: u64) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    let timeout = timeout_ms.min(libc::c_int::MAX as u64) as libc::c_int;
    loop {
        // SAFETY: `pfd` is one valid pollfd outliving the call.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout) };
        if rc > 0 {
            return Ok(true);
        }
        if rc == 0 {
            return Ok(false);
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::EINTR) {
            return Err(err);
        }
    }
}
