//! Metrics for async-logger
//!
//! Counters and gauges for authorization decisions and telemetry delivery,
//! exported as JSON or Prometheus text.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

/// Process-wide metrics registry
///
/// Updates are lock-free once a metric exists; the map lock is only taken
/// for writing when a metric is first touched.
pub struct MetricsRegistry {
    /// Counter metrics
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,

    /// Gauge metrics (current values)
    gauges: RwLock<HashMap<String, Arc<AtomicU64>>>,

    /// Service start time
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub fn inc_counter(&self, name: &str) {
        self.add_counter(name, 1);
    }

    /// Add to a counter
    pub fn add_counter(&self, name: &str, value: u64) {
        if value == 0 {
            return;
        }
        Self::slot(&self.counters, name).fetch_add(value, Ordering::Relaxed);
    }

    /// Set a gauge value
    pub fn set_gauge(&self, name: &str, value: u64) {
        Self::slot(&self.gauges, name).store(value, Ordering::Relaxed);
    }

    /// Get a counter value
    pub fn get_counter(&self, name: &str) -> u64 {
        Self::load(&self.counters, name)
    }

    /// Get a gauge value
    pub fn get_gauge(&self, name: &str) -> u64 {
        Self::load(&self.gauges, name)
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get all metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uptime_seconds": self.uptime_seconds(),
            "counters": Self::snapshot(&self.counters),
            "gauges": Self::snapshot(&self.gauges),
        })
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP async_logger_uptime_seconds Time since service start\n");
        output.push_str("# TYPE async_logger_uptime_seconds gauge\n");
        output.push_str(&format!(
            "async_logger_uptime_seconds {}\n\n",
            self.uptime_seconds()
        ));

        for (kind, map) in [("counter", &self.counters), ("gauge", &self.gauges)] {
            let mut values: Vec<_> = Self::snapshot(map).into_iter().collect();
            values.sort();
            for (name, value) in values {
                let prometheus_name = name.replace(['.', '-'], "_");
                output.push_str(&format!("# TYPE {} {}\n", prometheus_name, kind));
                output.push_str(&format!("{} {}\n", prometheus_name, value));
            }
        }

        output
    }

    fn slot(map: &RwLock<HashMap<String, Arc<AtomicU64>>>, name: &str) -> Arc<AtomicU64> {
        if let Some(slot) = map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return slot.clone();
        }

        map.write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone()
    }

    fn load(map: &RwLock<HashMap<String, Arc<AtomicU64>>>, name: &str) -> u64 {
        map.read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|v| v.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn snapshot(map: &RwLock<HashMap<String, Arc<AtomicU64>>>) -> HashMap<String, u64> {
        map.read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Predefined metric names
pub mod metric_names {
    // Authorization
    pub const CALLS_AUTHORIZED: &str = "async_logger.calls.authorized";
    pub const CALLS_DENIED: &str = "async_logger.calls.denied";

    // Emission queue
    pub const EMISSIONS_ENQUEUED: &str = "async_logger.emissions.enqueued";
    pub const EMISSIONS_DROPPED: &str = "async_logger.emissions.dropped";

    // Subscriber delivery
    pub const DELIVERIES_DROPPED: &str = "async_logger.deliveries.dropped";
    pub const SUBSCRIBERS_PRUNED: &str = "async_logger.subscribers.pruned";

    // Subscriber gauges
    pub const LOG_SUBSCRIBERS: &str = "async_logger.subscribers.log";
    pub const STAT_SUBSCRIBERS: &str = "async_logger.subscribers.stat";
}
