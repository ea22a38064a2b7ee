use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of threads consuming jobs from a bounded queue.
///
/// The queue depth is the server's admission limit: once every worker is busy
/// and the queue is full, [`WorkerPool::dispatch`] blocks, which in turn
/// stops the accept loop from taking on more connections than the pool can
/// absorb.
pub struct WorkerPool {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

impl WorkerPool {
    /// Spawns `workers` threads behind a queue holding at most `queue_depth`
    /// pending jobs.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero; configuration validation rejects that
    /// before a pool is ever built.
    pub fn new(workers: usize, queue_depth: usize) -> io::Result<Self> {
        assert!(workers > 0);

        let (sender, receiver) = bounded::<Job>(queue_depth);
        let workers = (0..workers)
            .map(|id| Worker::spawn(id, receiver.clone()))
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self {
            workers,
            sender: Some(sender),
        })
    }

    /// Hands one job to the pool, blocking while the queue is full.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            // Fails only once every worker is gone; the job (and the
            // connection it holds) is dropped, which closes the socket.
            if sender.send(Box::new(job)).is_err() {
                error!("worker queue is closed, dropping job");
            }
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets each worker drain what is queued and exit.
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.handle.join().is_err() {
                error!(worker = worker.id, "worker thread panicked");
            }
        }
    }
}

impl Worker {
    fn spawn(id: usize, receiver: Receiver<Job>) -> io::Result<Worker> {
        let handle = thread::Builder::new()
            .name(format!("worker-{id}"))
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
                debug!(worker = id, "worker shutting down");
            })?;
        Ok(Worker { id, handle })
    }
}
