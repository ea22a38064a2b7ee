use std::io;
use std::net::{SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ResourceError;
use crate::http::connection::Connection;
use crate::server::pool::WorkerPool;

/// Builds the IPv4 listening socket by hand instead of through
/// `TcpListener::bind`, because two details matter here: `SO_REUSEADDR` must
/// be set before the bind so restarts do not trip over sockets in TIME_WAIT,
/// and the backlog is the system maximum rather than the std default.
pub fn bind(addr: SocketAddrV4) -> Result<TcpListener, ResourceError> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
        .map_err(|source| ResourceError::Socket { source })?;
    socket
        .set_reuse_address(true)
        .map_err(|source| ResourceError::Socket { source })?;

    let addr = SocketAddr::V4(addr);
    socket
        .bind(&addr.into())
        .map_err(|source| ResourceError::Bind { addr, source })?;
    socket
        .listen(libc::SOMAXCONN)
        .map_err(|source| ResourceError::Listen { addr, source })?;

    Ok(socket.into())
}

/// The accept loop and the worker pool it feeds.
pub struct Server {
    listener: TcpListener,
    pool: WorkerPool,
    config: Arc<Config>,
}

impl Server {
    /// Binds the configured address and spawns the worker pool.
    pub fn new(config: Config) -> anyhow::Result<Server> {
        let listener = bind(config.listen)?;
        let pool = WorkerPool::new(config.workers, config.queue_depth)?;
        Ok(Server {
            listener,
            pool,
            config: Arc::new(config),
        })
    }

    /// The address the listener actually bound, with any ephemeral port
    /// resolved.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, queueing each one for the pool.
    ///
    /// A failed accept is logged and the loop continues; only construction
    /// can fail, never serving.
    pub fn run(self) -> anyhow::Result<()> {
        let addr = self.listener.local_addr()?;
        info!(
            %addr,
            workers = self.pool.worker_count(),
            file = %self.config.file.display(),
            chunk_size = self.config.chunk_size,
            "listening"
        );

        loop {
            match self.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    let config = Arc::clone(&self.config);
                    self.pool.dispatch(move || {
                        let conn = Connection::new(stream, peer, config);
                        if let Err(e) = conn.run() {
                            warn!(%peer, error = %e, "connection failed");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                    // Don't spin hot when accept fails repeatedly, e.g. on
                    // descriptor exhaustion.
                    thread::sleep(Duration::from_millis(100));
                }
            }
        }
    }

    fn accept(&self) -> Result<(TcpStream, SocketAddr), ResourceError> {
        self.listener
            .accept()
            .map_err(|source| ResourceError::Accept { source })
    }
}
