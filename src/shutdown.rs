//! Graceful shutdown handling
//!
//! Streaming endpoints run until their client disconnects, so the gRPC
//! server alone cannot drain them. Each relay task holds a [`ShutdownSignal`]
//! and a [`StreamGuard`]; on shutdown the relays end their streams and the
//! coordinator waits for the guards to be released.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::{watch, Notify};
use tracing::{info, warn};

/// Shutdown signal that can be cloned into tasks
#[derive(Clone)]
pub struct ShutdownSignal {
    watch_rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Check if shutdown has been initiated
    pub fn is_shutdown(&self) -> bool {
        *self.watch_rx.borrow()
    }

    /// Wait until shutdown is initiated. Returns immediately if it already was.
    pub async fn wait(&self) {
        let mut rx = self.watch_rx.clone();
        // Err means the coordinator is gone, which also ends every stream
        let _ = rx.wait_for(|shutdown| *shutdown).await;
    }
}

/// Counts live streaming calls so shutdown can wait for them
#[derive(Default)]
pub struct StreamTracker {
    active: AtomicU64,
    total: AtomicU64,
    drained: Notify,
}

impl StreamTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stream starting; the stream ends when the guard drops
    pub fn stream_start(self: &Arc<Self>) -> StreamGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        StreamGuard {
            tracker: self.clone(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Wait for all streams to end. Returns false on timeout.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let drain = async {
            loop {
                let notified = self.drained.notified();
                if self.active_count() == 0 {
                    return;
                }
                notified.await;
            }
        };

        match tokio::time::timeout(timeout, drain).await {
            Ok(()) => {
                info!("All streams drained");
                true
            }
            Err(_) => {
                warn!(
                    active = self.active_count(),
                    "Timeout waiting for streams to drain"
                );
                false
            }
        }
    }
}

/// Marks one live stream; decrements the tracker when dropped
pub struct StreamGuard {
    tracker: Arc<StreamTracker>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if self.tracker.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.drained.notify_waiters();
        }
    }
}

/// Owner of the shutdown state
pub struct ShutdownCoordinator {
    shutdown: AtomicBool,
    watch_tx: watch::Sender<bool>,
    streams: Arc<StreamTracker>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (watch_tx, _) = watch::channel(false);

        Self {
            shutdown: AtomicBool::new(false),
            watch_tx,
            streams: Arc::new(StreamTracker::new()),
        }
    }

    /// Get a shutdown signal that can be cloned
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            watch_rx: self.watch_tx.subscribe(),
        }
    }

    pub fn stream_tracker(&self) -> Arc<StreamTracker> {
        self.streams.clone()
    }

    /// Initiate shutdown. Later calls are no-ops.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            active_streams = self.streams.active_count(),
            "Initiating graceful shutdown"
        );
        self.watch_tx.send_replace(true);
    }

    /// Initiate shutdown and wait for live streams to end
    pub async fn graceful_shutdown(&self, drain_timeout: Duration) -> bool {
        self.shutdown();
        self.streams.wait_for_drain(drain_timeout).await
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete when the process receives Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
