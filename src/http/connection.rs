use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http::request::{self, RequestKind};
use crate::http::response::Response;
use crate::http::writer::{self, SendStatus};
use crate::transfer::{self, ServedFile, StallPolicy};

/// One accepted connection, driven through its states until teardown.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<Config>,
    state: ConnectionState,
}

enum ConnectionState {
    /// Waiting for the single classifying read.
    Reading,
    /// The request was not GET or HEAD; a 405 goes out.
    Rejecting,
    /// GET or HEAD: open the file and send the 200 headers.
    Serving(RequestKind),
    /// GET only: stream the opened file.
    Streaming(ServedFile),
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, config: Arc<Config>) -> Self {
        Self {
            stream,
            peer,
            config,
            state: ConnectionState::Reading,
        }
    }

    /// Handles the connection to completion.
    ///
    /// Whatever happens inside, both directions of the stream are shut down
    /// before the descriptor is released; an error return still tears the
    /// connection down first.
    pub fn run(mut self) -> anyhow::Result<()> {
        let result = self.drive();
        let _ = self.stream.shutdown(Shutdown::Both);
        result
    }

    fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::Reading => match request::read_request_kind(&mut self.stream) {
                    Ok(Some(RequestKind::Unsupported)) => ConnectionState::Rejecting,
                    Ok(Some(kind)) => ConnectionState::Serving(kind),
                    Ok(None) => {
                        // Peer connected and left; it gets no response.
                        debug!(peer = %self.peer, "peer closed before sending a request");
                        ConnectionState::Closed
                    }
                    Err(e) => {
                        debug!(peer = %self.peer, error = %e, "request read failed");
                        ConnectionState::Closed
                    }
                },

                ConnectionState::Rejecting => {
                    self.send(&Response::method_not_allowed())?;
                    ConnectionState::Closed
                }

                ConnectionState::Serving(kind) => match ServedFile::open(&self.config.file) {
                    Ok(file) => match self.send(&Response::ok_stream(file.len()))? {
                        SendStatus::Sent if kind.wants_body() => ConnectionState::Streaming(file),
                        SendStatus::Sent => ConnectionState::Closed,
                        SendStatus::PeerGone => ConnectionState::Closed,
                    },
                    Err(e) => {
                        warn!(peer = %self.peer, error = %e, "cannot open served file");
                        self.send(&Response::internal_error())?;
                        ConnectionState::Closed
                    }
                },

                ConnectionState::Streaming(file) => {
                    let policy = StallPolicy {
                        timeout_ms: self.config.stall_timeout_ms,
                        max_stalls: self.config.max_stalls,
                    };
                    let report =
                        transfer::send_file(&self.stream, &file, self.config.chunk_size, policy)?;
                    if report.complete {
                        info!(
                            peer = %self.peer,
                            bytes = report.bytes_sent,
                            chunks = report.chunks,
                            "served file"
                        );
                    } else {
                        debug!(
                            peer = %self.peer,
                            bytes = report.bytes_sent,
                            "transfer ended early"
                        );
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }
        Ok(())
    }

    fn send(&mut self, resp: &Response) -> io::Result<SendStatus> {
        writer::send_response(&mut self.stream, resp)
    }
}
