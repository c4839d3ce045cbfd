//! Rendering engine and worker pool
//!
//! The engine owns one headless Chromium process; workers are isolated,
//! pre-prepared pages handed out by a bounded pool. The pool is the only
//! shared mutable resource in the system, and all access goes through
//! acquire/release.

mod engine;
mod pool;
mod worker;

pub use engine::BrowserEngine;
pub use pool::{default_pool_size, PooledWorker, WorkerPool};
pub use worker::Worker;

use std::fmt;
use thiserror::Error;

/// Engine lifecycle status
///
/// `New -> Ready` on successful launch, `New -> Error` (terminal) on
/// launch failure, `Ready -> Disconnected` on unexpected engine loss.
/// Acquisitions fail fast unless the status is `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    New,
    Ready,
    Error,
    Disconnected,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::New => write!(f, "NEW"),
            EngineStatus::Ready => write!(f, "READY"),
            EngineStatus::Error => write!(f, "ERROR"),
            EngineStatus::Disconnected => write!(f, "DISCONNECTED"),
        }
    }
}

/// Errors from the engine, workers, and the pool
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Engine unavailable (status: {0})")]
    Unavailable(EngineStatus),

    #[error("Timed out waiting for a free worker after {0}ms")]
    AcquireTimeout(u64),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Worker error: {0}")]
    Worker(String),
}

impl PoolError {
    /// True for the two navigation outcomes the orchestrator may absorb
    /// when extraction still produced usable content.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            PoolError::Navigation { .. } | PoolError::NavigationTimeout { .. }
        )
    }
}

/// Result type for browser operations
pub type PoolResult<T> = Result<T, PoolError>;
