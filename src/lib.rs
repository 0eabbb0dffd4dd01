//! async-logger
//!
//! ACL-gated gRPC services with live telemetry fan-out. Every call must name
//! its consumer; calls are authorized against per-consumer access lists, and
//! each authorized call is streamed to `Admin.Logging` subscribers as an
//! audit event and to `Admin.Statistics` subscribers as a counter increment.
//!
//! ## Modules
//!
//! - [`acl`] - ACL payload parsing and lookup
//! - [`auth`] - Authorization decision and the `Governed` capability
//! - [`hub`] - Subscriber registries, stat aggregation, emission queue
//! - [`grpc`] - Biz and Admin services and the ACL layer
//! - [`metrics`] - Counters and gauges with Prometheus export
//! - [`telemetry`] - Tracing subscriber and OpenTelemetry setup
//! - [`shutdown`] - Graceful shutdown coordination
//! - [`server`] - Configuration, startup and the binary entry point
//! - [`proto`] - Protocol buffer definitions

pub mod acl;
pub mod auth;
pub mod grpc;
pub mod hub;
pub mod metrics;
pub mod proto;
pub mod server;
pub mod shutdown;
pub mod telemetry;

// Re-export commonly used types
pub use acl::{AclError, AclTable, AclTables, ServiceGroup};
pub use auth::{AuthError, AuthorizedCall, Governed, CONSUMER_HEADER};
pub use hub::{AuditEvent, StatSnapshot, TelemetryHub};
pub use server::{start, Config, ConfigError, RunningServer};
