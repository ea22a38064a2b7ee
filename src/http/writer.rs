use std::io::{self, Write};
use std::net::TcpStream;

use tracing::debug;

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Outcome of sending a response to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// The whole response went out.
    Sent,
    /// The peer hung up before or during the send. Not an error: the
    /// connection simply moves on to teardown without a response.
    PeerGone,
}

/// Serializes a response into the exact bytes that go on the wire:
/// status line, headers in map order, blank line, inline body.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256 + resp.body.len());

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf.extend_from_slice(&resp.body);

    buf
}

/// Sends a response in one blocking write.
///
/// A peer that vanished mid-send (broken pipe, connection reset) is reported
/// as [`SendStatus::PeerGone`] rather than an error; anything else the kernel
/// refuses is returned as the I/O error it was.
pub fn send_response(stream: &mut TcpStream, resp: &Response) -> io::Result<SendStatus> {
    let buf = serialize_response(resp);
    match stream.write_all(&buf) {
        Ok(()) => Ok(SendStatus::Sent),
        Err(e) if is_peer_gone(&e) => {
            debug!(status = resp.status.as_u16(), "peer gone before response was sent");
            Ok(SendStatus::PeerGone)
        }
        Err(e) => Err(e),
    }
}

fn is_peer_gone(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset
    )
}
