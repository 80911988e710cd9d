//! Fixed-size worker pool owned by a loaded module instance
//!
//! CPU inference inside a module fans out over a pool sized at load time
//! from the configured thread count. The pool never escapes its module
//! instance; teardown closes the channel and joins every worker before the
//! instance is released.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size thread pool fed over a crossbeam channel.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

impl WorkerPool {
    /// Spawn `size` workers named after the owning module sub-unit.
    ///
    /// Fails when the OS refuses a thread; workers spawned before the
    /// failure exit once the channel sender is dropped.
    pub fn new(size: usize, name: &str) -> std::io::Result<Self> {
        let size = size.max(1);
        let (sender, receiver): (Sender<Job>, Receiver<Job>) = crossbeam_channel::unbounded();

        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let receiver = receiver.clone();
            let worker = std::thread::Builder::new()
                .name(format!("{name}-{i}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })?;
            workers.push(worker);
        }

        debug!("Started worker pool '{name}' with {size} threads");
        Ok(Self {
            sender: Some(sender),
            workers,
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queue a job for execution on the pool.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        if let Some(sender) = &self.sender {
            // Send only fails when all workers are gone, i.e. during drop.
            let _ = sender.send(Box::new(job));
        }
    }

    /// Run a job on the pool and block until its value is available.
    pub fn run<T, F>(&self, job: F) -> T
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.submit(move || {
            let _ = tx.send(job());
        });
        rx.recv().unwrap_or_else(|_| unreachable!("worker dropped result channel"))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets the workers drain and exit.
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool").field("size", &self.size).finish()
    }
}
