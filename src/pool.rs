//! Bounded pool of warm recognition workers
//!
//! ```text
//! checkout() ──► [semaphore permit] ──► idle.pop() or factory() ──► PooledWorker
//!                                                                      │
//!            idle.push(worker) ◄── drop (worker restored) ◄────────────┤
//!            worker discarded  ◄── drop (worker taken, not restored) ◄─┘
//! ```
//!
//! A worker that was taken out of its guard and never put back is assumed to
//! be in an unknown state and is dropped; the permit is always released.
//! New workers are built on the blocking thread pool.

use crate::error::OcrError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

type Factory<W> = dyn Fn() -> Result<W, OcrError> + Send + Sync;

struct PoolInner<W> {
    idle: Mutex<Vec<W>>,
    factory: Box<Factory<W>>,
    created: AtomicUsize,
}

pub struct WorkerPool<W> {
    inner: Arc<PoolInner<W>>,
    permits: Arc<Semaphore>,
    max_size: usize,
}

/// Pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub created: usize,
    pub idle: usize,
    pub in_use: usize,
    pub max_size: usize,
}

impl<W: Send + 'static> WorkerPool<W> {
    pub fn new<F>(max_size: usize, factory: F) -> Self
    where
        F: Fn() -> Result<W, OcrError> + Send + Sync + 'static,
    {
        let max_size = max_size.max(1);
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(Vec::with_capacity(max_size)),
                factory: Box::new(factory),
                created: AtomicUsize::new(0),
            }),
            permits: Arc::new(Semaphore::new(max_size)),
            max_size,
        }
    }

    /// Wait for a free slot and hand out an idle worker, creating one if
    /// none is idle
    pub async fn checkout(&self) -> Result<PooledWorker<W>, OcrError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| OcrError::Internal(format!("Worker pool closed: {}", e)))?;

        let idle = self.inner.idle.lock().pop();
        let worker = match idle {
            Some(worker) => worker,
            None => {
                let inner = self.inner.clone();
                let worker = tokio::task::spawn_blocking(move || (inner.factory)())
                    .await
                    .map_err(|e| OcrError::Internal(format!("Worker creation failed: {}", e)))??;
                let created = self.inner.created.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!("Created recognition worker #{}", created);
                worker
            }
        };

        Ok(PooledWorker {
            worker: Some(worker),
            inner: self.inner.clone(),
            _permit: permit,
        })
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.inner.created.load(Ordering::Relaxed),
            idle: self.inner.idle.lock().len(),
            in_use: self.max_size - self.permits.available_permits(),
            max_size: self.max_size,
        }
    }
}

/// RAII guard: returns its worker to the pool on drop
pub struct PooledWorker<W> {
    worker: Option<W>,
    inner: Arc<PoolInner<W>>,
    _permit: OwnedSemaphorePermit,
}

impl<W> PooledWorker<W> {
    /// Move the worker out, e.g. into a blocking task. Call [`restore`]
    /// afterwards to make it reusable.
    ///
    /// [`restore`]: PooledWorker::restore
    pub fn take(&mut self) -> Option<W> {
        self.worker.take()
    }

    pub fn restore(&mut self, worker: W) {
        self.worker = Some(worker);
    }
}

impl<W> Drop for PooledWorker<W> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.inner.idle.lock().push(worker);
        }
    }
}
