//! The HTTP surface: just enough protocol to serve one file.
//!
//! There is no request parser here. A connection is classified from the first
//! bytes it sends, answered with one response, and closed.
//!
//! # Architecture
//!
//! - **`request`**: the single classifying read and the GET/HEAD/other split
//! - **`response`**: response representation with builder pattern
//! - **`writer`**: serializes a response and sends it in one blocking write
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← One read, classify the method prefix
//!        └──────┬──────┘
//!               │
//!       ┌───────┼──────────────┐
//!       │       │              │
//!  dead peer  GET/HEAD       other
//!       │       ▼              ▼
//!       │  ┌──────────┐  ┌───────────┐
//!       │  │ Serving  │  │ Rejecting │ ← 405 with Allow: GET, HEAD
//!       │  └────┬─────┘  └─────┬─────┘
//!       │       │ 200 headers  │
//!       │       ▼              │
//!       │  ┌───────────┐       │
//!       │  │ Streaming │ (GET only: sendfile loop)
//!       │  └────┬──────┘       │
//!       ▼       ▼              ▼
//!        ┌─────────────┐
//!        │   Closed    │ ← shutdown both directions, release the socket
//!        └─────────────┘
//! ```

pub mod connection;
pub mod request;
pub mod response;
pub mod writer;
