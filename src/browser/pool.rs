//! Bounded worker pool
//!
//! Capacity is a semaphore sized from available system memory (one worker
//! per GiB, floor of 16) unless overridden. Idle workers are validated
//! before reuse and again on release; failures destroy the worker and a
//! fresh one is created transparently, visible to callers only as added
//! latency.

use crate::browser::engine::BrowserEngine;
use crate::browser::worker::Worker;
use crate::browser::{EngineStatus, PoolError, PoolResult};
use crate::config::BrowserConfig;
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

const GIB: u64 = 1024 * 1024 * 1024;

/// Pool of prepared workers over one engine
pub struct WorkerPool {
    engine: Arc<BrowserEngine>,
    idle: Mutex<Vec<Worker>>,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
    max_workers: usize,
}

impl WorkerPool {
    /// Builds the pool; capacity comes from config or the memory formula
    pub fn new(engine: Arc<BrowserEngine>, config: &BrowserConfig) -> Self {
        let max_workers = config
            .max_workers
            .unwrap_or_else(|| default_pool_size(available_memory_bytes()));

        tracing::info!("Worker pool sized at {} workers", max_workers);

        Self {
            engine,
            idle: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(max_workers)),
            acquire_timeout: Duration::from_millis(config.acquire_timeout_ms),
            max_workers,
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Engine status as seen by the pool
    pub fn status(&self) -> EngineStatus {
        self.engine.status()
    }

    /// Pre-creates the minimum warm worker so the first crawl does not pay
    /// the full page-creation cost.
    pub async fn warm_up(&self) -> PoolResult<()> {
        let worker = self.engine.new_worker().await?;
        self.idle.lock().unwrap().push(worker);
        Ok(())
    }

    /// Acquires a worker, waiting up to the acquisition timeout
    ///
    /// Fails fast when the engine is not `Ready`. Idle workers that fail
    /// validation are destroyed and replaced before handing anything out.
    pub async fn acquire(&self) -> PoolResult<PooledWorker> {
        if self.engine.status() != EngineStatus::Ready {
            return Err(PoolError::Unavailable(self.engine.status()));
        }

        let permit = tokio::time::timeout(
            self.acquire_timeout,
            Arc::clone(&self.permits).acquire_owned(),
        )
        .await
        .map_err(|_| PoolError::AcquireTimeout(self.acquire_timeout.as_millis() as u64))?
        .map_err(|e| PoolError::Worker(format!("pool closed: {}", e)))?;

        loop {
            let candidate = self.idle.lock().unwrap().pop();
            let Some(worker) = candidate else { break };

            if self.engine.status() == EngineStatus::Ready && worker.is_healthy().await {
                return Ok(PooledWorker::new(worker, permit));
            }

            tracing::debug!("Discarding unhealthy idle worker {}", worker.id());
            worker.close().await;
        }

        let worker = self.engine.new_worker().await?;
        Ok(PooledWorker::new(worker, permit))
    }

    /// Returns a worker to the pool
    ///
    /// The worker is validated once more; only healthy workers rejoin the
    /// idle set. The capacity permit is restored either way.
    pub async fn release(&self, mut pooled: PooledWorker) {
        let Some(worker) = pooled.worker.take() else {
            return;
        };

        if self.engine.status() == EngineStatus::Ready && worker.is_healthy().await {
            self.idle.lock().unwrap().push(worker);
        } else {
            tracing::debug!("Destroying worker {} on release", worker.id());
            worker.close().await;
        }
        // `pooled` drops here, restoring the permit
    }
}

/// A worker checked out of the pool
///
/// Dropping the guard without an explicit release destroys the page on a
/// background task and restores the permit, so pool capacity survives
/// every exit path, including panics and early returns.
pub struct PooledWorker {
    worker: Option<Worker>,
    runtime: tokio::runtime::Handle,
    _permit: OwnedSemaphorePermit,
}

impl PooledWorker {
    fn new(worker: Worker, permit: OwnedSemaphorePermit) -> Self {
        Self {
            worker: Some(worker),
            runtime: tokio::runtime::Handle::current(),
            _permit: permit,
        }
    }

    /// Access to the checked-out worker
    pub fn worker(&self) -> &Worker {
        self.worker
            .as_ref()
            .expect("PooledWorker: worker already released")
    }
}

impl Deref for PooledWorker {
    type Target = Worker;

    fn deref(&self) -> &Self::Target {
        self.worker()
    }
}

impl Drop for PooledWorker {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let (id, page) = worker.into_page();
            self.runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::debug!("Drop cleanup failed for worker {}: {}", id, e);
                }
            });
        }
    }
}

/// Maximum pool size for the given amount of available memory
///
/// One worker per GiB plus one, with a floor of 16 -- the same sizing the
/// acquisition semaphore is built from.
pub fn default_pool_size(available_bytes: Option<u64>) -> usize {
    let by_memory = available_bytes
        .map(|bytes| 1 + (bytes / GIB) as usize)
        .unwrap_or(1);
    by_memory.max(16)
}

/// Available system memory, when the platform exposes it
pub fn available_memory_bytes() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo_available(&meminfo)
}

/// Pulls `MemAvailable` (kB) out of /proc/meminfo content
fn parse_meminfo_available(meminfo: &str) -> Option<u64> {
    meminfo
        .lines()
        .find(|line| line.starts_with("MemAvailable:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|value| value.parse::<u64>().ok())
        .map(|kib| kib * 1024)
}
