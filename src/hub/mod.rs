//! Telemetry fan-out for authorized calls
//!
//! ```text
//! interceptor ──► Publisher ──► [emission queue] ──► Emitter ──► TelemetryHub
//!                 (try_send)        (bounded)                      │
//!                                                   ┌──────────────┴─────────────┐
//!                                                   ▼                            ▼
//!                                     logs: SubscriberRegistry    stats: SubscriberRegistry
//!                                           │ │ │                        │ │
//!                                    Admin.Logging streams      Admin.Statistics streams
//! ```
//!
//! The hub is the only owner of the subscriber registries and is passed
//! explicitly to every service that publishes or subscribes.

mod publisher;
mod registry;
mod stats;

pub use publisher::{Emitter, Publisher};
pub use registry::{BroadcastOutcome, SubscriberId, SubscriberRegistry, Subscription};
pub use stats::{StatAggregator, StatSnapshot};

use std::sync::Arc;

use crate::metrics::{metric_names, MetricsRegistry};

/// Audit record for one authorized call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Unix timestamp (seconds) of emission
    pub timestamp: i64,
    pub consumer: String,
    /// Full method name, e.g. `/logger.Biz/Check`
    pub method: String,
    /// Caller address as `ip:port`
    pub host: String,
}

/// An authorized call waiting to be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub consumer: String,
    pub method: String,
    pub host: String,
}

/// Owner of the log and stat subscriber registries
pub struct TelemetryHub {
    logs: Arc<SubscriberRegistry<AuditEvent>>,
    stats: Arc<SubscriberRegistry<StatSnapshot>>,
    metrics: Arc<MetricsRegistry>,
}

impl TelemetryHub {
    /// Create a hub whose subscriber queues hold `subscriber_capacity` messages
    pub fn new(subscriber_capacity: usize, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            logs: Arc::new(SubscriberRegistry::new("logs", subscriber_capacity)),
            stats: Arc::new(SubscriberRegistry::new("stats", subscriber_capacity)),
            metrics,
        }
    }

    pub fn logs(&self) -> &Arc<SubscriberRegistry<AuditEvent>> {
        &self.logs
    }

    pub fn stats(&self) -> &Arc<SubscriberRegistry<StatSnapshot>> {
        &self.stats
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Broadcast one audit event and one stat increment for `record`
    pub fn emit(&self, record: CallRecord) {
        let increment = StatSnapshot::increment(&record.consumer, &record.method);
        let event = AuditEvent {
            timestamp: chrono::Utc::now().timestamp(),
            consumer: record.consumer,
            method: record.method,
            host: record.host,
        };

        let log_outcome = self.logs.broadcast(&event);
        let stat_outcome = self.stats.broadcast(&increment);

        for outcome in [log_outcome, stat_outcome] {
            self.metrics
                .add_counter(metric_names::DELIVERIES_DROPPED, outcome.dropped as u64);
            self.metrics
                .add_counter(metric_names::SUBSCRIBERS_PRUNED, outcome.pruned as u64);
        }
    }

    /// Refresh the subscriber gauges
    pub fn record_gauges(&self) {
        self.metrics
            .set_gauge(metric_names::LOG_SUBSCRIBERS, self.logs.len() as u64);
        self.metrics
            .set_gauge(metric_names::STAT_SUBSCRIBERS, self.stats.len() as u64);
    }
}
