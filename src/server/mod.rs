//! Listening endpoint, accept loop, and the worker pool behind them.

pub mod listener;
pub mod pool;

pub use listener::Server;
pub use pool::WorkerPool;
