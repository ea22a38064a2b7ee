//! Zero-copy file-to-socket transfer.
//!
//! The served file's bytes go straight from the page cache to the socket via
//! `sendfile(2)`, in bounded chunks, with a bounded-stall retry policy for
//! sockets that stop accepting data.

pub mod file;
pub mod sendfile;

pub use file::ServedFile;
pub use sendfile::{StallPolicy, Transfer, send_file};
