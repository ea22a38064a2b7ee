//! Streamix - single-file zero-copy HTTP streamer
//!
//! Serves exactly one file over HTTP. GET streams it with `sendfile(2)`,
//! HEAD returns the same headers without the body, everything else gets 405.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
pub mod transfer;
