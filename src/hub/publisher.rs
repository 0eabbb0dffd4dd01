//! Telemetry emission queue
//!
//! The interceptor hands each authorized call to a [`Publisher`], which
//! enqueues it without waiting. A single [`Emitter`] task drains the queue and
//! broadcasts through the [`TelemetryHub`]. Because there is exactly one
//! emitter, every subscriber observes calls in the order they were enqueued.
//!
//! [`Publisher::flush`] places a marker in the same queue, so a handler can
//! wait until every call enqueued before it has reached the registries.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

use super::{CallRecord, TelemetryHub};
use crate::metrics::{metric_names, MetricsRegistry};
use crate::telemetry::spans;

enum Emission {
    Call(CallRecord),
    Flush(oneshot::Sender<()>),
}

/// Non-blocking handle for submitting authorized calls
#[derive(Clone)]
pub struct Publisher {
    tx: mpsc::Sender<Emission>,
    metrics: Arc<MetricsRegistry>,
}

impl Publisher {
    /// Enqueue a call record. Returns false when the record was dropped
    /// because the queue is full or the emitter has stopped.
    pub fn publish(&self, record: CallRecord) -> bool {
        match self.tx.try_send(Emission::Call(record)) {
            Ok(()) => {
                self.metrics.inc_counter(metric_names::EMISSIONS_ENQUEUED);
                true
            }
            Err(e) => {
                self.metrics.inc_counter(metric_names::EMISSIONS_DROPPED);
                debug!(error = %e, "Telemetry record dropped");
                false
            }
        }
    }

    /// Wait until every record enqueued before this call has been emitted.
    /// Returns false when the emitter has stopped.
    pub async fn flush(&self) -> bool {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Emission::Flush(ack)).await.is_err() {
            return false;
        }
        done.await.is_ok()
    }
}

/// Owner of the emitter task
pub struct Emitter {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Emitter {
    /// Start the emitter with a queue of `capacity` records
    pub fn spawn(hub: Arc<TelemetryHub>, capacity: usize) -> (Publisher, Emitter) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (stop, stop_rx) = oneshot::channel();
        let publisher = Publisher {
            tx,
            metrics: hub.metrics().clone(),
        };
        let handle = tokio::spawn(run(hub, rx, stop_rx).instrument(info_span!(spans::EMITTER)));
        (publisher, Emitter { stop, handle })
    }

    /// Stop accepting records, emit everything already queued, and wait for
    /// the task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            error!(error = %e, "Emitter task failed");
        }
    }
}

async fn run(
    hub: Arc<TelemetryHub>,
    mut rx: mpsc::Receiver<Emission>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => {
                rx.close();
                let mut drained = 0usize;
                while let Some(emission) = rx.recv().await {
                    match emission {
                        Emission::Call(record) => {
                            hub.emit(record);
                            drained += 1;
                        }
                        Emission::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                info!(drained, "Emitter stopped");
                return;
            }
            emission = rx.recv() => match emission {
                Some(Emission::Call(record)) => hub.emit(record),
                Some(Emission::Flush(ack)) => {
                    let _ = ack.send(());
                }
                None => {
                    debug!("All publishers dropped, emitter exiting");
                    return;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::StatSnapshot;

    fn record(consumer: &str, method: &str) -> CallRecord {
        CallRecord {
            consumer: consumer.to_string(),
            method: method.to_string(),
            host: "127.0.0.1:50000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_both_registries() {
        let hub = Arc::new(TelemetryHub::new(16, Arc::new(MetricsRegistry::new())));
        let mut logs = hub.logs().subscribe();
        let mut stats = hub.stats().subscribe();
        let (publisher, emitter) = Emitter::spawn(hub.clone(), 16);

        assert!(publisher.publish(record("alice", "/logger.Biz/Check")));

        let event = logs.recv().await.unwrap();
        assert_eq!(event.consumer, "alice");
        assert_eq!(event.method, "/logger.Biz/Check");
        assert_eq!(event.host, "127.0.0.1:50000");

        let increment = stats.recv().await.unwrap();
        assert_eq!(increment, StatSnapshot::increment("alice", "/logger.Biz/Check"));

        emitter.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let metrics = Arc::new(MetricsRegistry::new());
        let hub = Arc::new(TelemetryHub::new(64, metrics.clone()));
        let mut logs = hub.logs().subscribe();
        let (publisher, emitter) = Emitter::spawn(hub.clone(), 64);

        for i in 0..10 {
            publisher.publish(record(&format!("c{i}"), "/logger.Biz/Test"));
        }
        emitter.shutdown().await;

        for i in 0..10 {
            assert_eq!(logs.try_recv().unwrap().consumer, format!("c{i}"));
        }
        assert!(!publisher.publish(record("late", "/logger.Biz/Test")));
        assert_eq!(metrics.get_counter(metric_names::EMISSIONS_ENQUEUED), 10);
        assert_eq!(metrics.get_counter(metric_names::EMISSIONS_DROPPED), 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_record() {
        let metrics = Arc::new(MetricsRegistry::new());
        let (tx, mut rx) = mpsc::channel(1);
        let publisher = Publisher {
            tx,
            metrics: metrics.clone(),
        };

        assert!(publisher.publish(record("alice", "/logger.Biz/Check")));
        assert!(!publisher.publish(record("bob", "/logger.Biz/Add")));

        assert_eq!(metrics.get_counter(metric_names::EMISSIONS_ENQUEUED), 1);
        assert_eq!(metrics.get_counter(metric_names::EMISSIONS_DROPPED), 1);
        match rx.try_recv() {
            Ok(Emission::Call(kept)) => assert_eq!(kept.consumer, "alice"),
            _ => panic!("expected the first record to be queued"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_flush_waits_for_earlier_records() {
        let hub = Arc::new(TelemetryHub::new(16, Arc::new(MetricsRegistry::new())));
        let mut logs = hub.logs().subscribe();
        let (publisher, emitter) = Emitter::spawn(hub.clone(), 16);

        publisher.publish(record("alice", "/logger.Biz/Check"));
        publisher.publish(record("bob", "/logger.Biz/Add"));
        assert!(publisher.flush().await);

        assert_eq!(logs.try_recv().unwrap().consumer, "alice");
        assert_eq!(logs.try_recv().unwrap().consumer, "bob");

        emitter.shutdown().await;
        assert!(!publisher.flush().await);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_absorbed() {
        let hub = Arc::new(TelemetryHub::new(4, Arc::new(MetricsRegistry::new())));
        let (publisher, emitter) = Emitter::spawn(hub, 4);

        assert!(publisher.publish(record("alice", "/logger.Biz/Check")));
        emitter.shutdown().await;
    }
}
