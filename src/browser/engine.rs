//! Engine lifecycle
//!
//! Launches the Chromium process, drives its CDP event handler on a
//! background task, and tracks the engine status shared with the pool.
//! Launch failure is fatal; losing the engine after launch flips the
//! status to `Disconnected` so future acquisitions fail fast.

use crate::browser::worker::Worker;
use crate::browser::{EngineStatus, PoolError, PoolResult};
use crate::config::BrowserConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Handle to the launched rendering engine
pub struct BrowserEngine {
    browser: Browser,
    config: BrowserConfig,
    status: Arc<Mutex<EngineStatus>>,
    next_worker_id: AtomicU64,
    _handler_task: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launches the engine
    ///
    /// A launch failure leaves the status at `Error` and is returned to the
    /// caller; the process cannot serve crawls without an engine.
    pub async fn launch(config: BrowserConfig) -> PoolResult<Self> {
        let status = Arc::new(Mutex::new(EngineStatus::New));

        let chrome_config = ChromeConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .build()
            .map_err(PoolError::Launch)?;

        let (browser, mut handler) = match Browser::launch(chrome_config).await {
            Ok(launched) => launched,
            Err(e) => {
                *status.lock().unwrap() = EngineStatus::Error;
                tracing::error!("Browser launch failed: {}", e);
                return Err(PoolError::Launch(e.to_string()));
            }
        };

        *status.lock().unwrap() = EngineStatus::Ready;
        tracing::info!("Browser engine launched");

        // Drive CDP events until the engine goes away; a finished handler
        // stream means the connection is gone for good.
        let handler_status = Arc::clone(&status);
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
            tracing::warn!("Browser engine disconnected");
            *handler_status.lock().unwrap() = EngineStatus::Disconnected;
        });

        Ok(Self {
            browser,
            config,
            status,
            next_worker_id: AtomicU64::new(0),
            _handler_task: handler_task,
        })
    }

    /// Current engine status
    pub fn status(&self) -> EngineStatus {
        *self.status.lock().unwrap()
    }

    /// Creates and prepares a fresh worker
    pub async fn new_worker(&self) -> PoolResult<Worker> {
        if self.status() != EngineStatus::Ready {
            return Err(PoolError::Unavailable(self.status()));
        }

        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        Worker::create(&self.browser, &self.config, id).await
    }
}
