//! Storage executor
//!
//! Runs filesystem units of work on tokio's blocking pool. A semaphore sized
//! to the worker count bounds how many units touch the disk at once, and a
//! second one bounds how many may be admitted (running or waiting) at all.

use log::{error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::ExecutorError;

pub const DEFAULT_WORKER_COUNT: usize = 10;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Pending result of a unit of work submitted to the pool
#[derive(Debug)]
pub struct UnitHandle<T> {
    task: JoinHandle<Result<T, ExecutorError>>,
}

impl<T> UnitHandle<T> {
    /// Waits for the unit to finish and returns its value.
    pub async fn wait(self) -> Result<T, ExecutorError> {
        match self.task.await {
            Ok(result) => result,
            Err(_) => Err(ExecutorError::WorkerLost),
        }
    }
}

/// Bounded pool for filesystem operations
pub struct StorageExecutor {
    admission: Arc<Semaphore>,
    workers: Arc<Semaphore>,
    capacity: u32,
    closing: AtomicBool,
    worker_count: usize,
}

impl StorageExecutor {
    /// Allows `worker_count` concurrent units, with up to `queue_capacity`
    /// more admitted and waiting for a worker.
    pub fn new(worker_count: usize, queue_capacity: usize) -> Self {
        let worker_count = worker_count.max(1);
        let queue_capacity = queue_capacity.max(1);
        let capacity = u32::try_from(worker_count + queue_capacity).unwrap_or(u32::MAX);

        info!(
            "Storage executor started with {} workers (queue capacity {})",
            worker_count, queue_capacity
        );

        Self {
            admission: Arc::new(Semaphore::new(capacity as usize)),
            workers: Arc::new(Semaphore::new(worker_count)),
            capacity,
            closing: AtomicBool::new(false),
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_shut_down(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Admits a unit of work and returns a handle to its result without
    /// waiting for it to run. Waits for a free slot when the pool is full.
    ///
    /// A panic inside the unit is reported through the handle as
    /// [`ExecutorError::UnitPanicked`]; other units are unaffected.
    pub async fn dispatch<F, T>(&self, unit: F) -> Result<UnitHandle<T>, ExecutorError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_shut_down() {
            return Err(ExecutorError::ShutDown);
        }

        let slot = Arc::clone(&self.admission)
            .acquire_owned()
            .await
            .map_err(|_| ExecutorError::ShutDown)?;
        let workers = Arc::clone(&self.workers);

        let task = tokio::spawn(async move {
            let _slot = slot;
            let _permit = workers
                .acquire_owned()
                .await
                .map_err(|_| ExecutorError::ShutDown)?;

            tokio::task::spawn_blocking(unit).await.map_err(|e| {
                if e.is_panic() {
                    error!("Unit of work panicked: {}", e);
                    ExecutorError::UnitPanicked(e.to_string())
                } else {
                    ExecutorError::WorkerLost
                }
            })
        });

        Ok(UnitHandle { task })
    }

    /// Admits a unit of work and waits for its result.
    pub async fn submit<F, T>(&self, unit: F) -> Result<T, ExecutorError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.dispatch(unit).await?.wait().await
    }

    /// Stops admitting work and waits until every admitted unit has
    /// finished. Calling it more than once is a no-op.
    pub async fn shutdown(&self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Shutting down storage executor ({} workers)", self.worker_count);

        // Every slot comes back only once all admitted units are done
        match self.admission.acquire_many(self.capacity).await {
            Ok(_drained) => {
                self.admission.close();
                info!("Storage executor stopped");
            }
            Err(e) => error!("Failed to drain storage executor: {}", e),
        }
    }
}
