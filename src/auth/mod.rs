//! Consumer authorization for gRPC calls
//!
//! Every call must carry a `consumer` metadata entry naming the caller. The
//! caller is authorized against the [`AclTable`] of the service group that
//! handles the call.
//!
//! # Decision procedure
//!
//! 1. No `consumer` metadata → `Unauthenticated` ("disallowed method"), no lookup
//! 2. Request path not `/<package>.<service>/<method>` → `InvalidArgument`
//! 3. Service not governed by the handling implementation → `Unknown`
//! 4. No matching ACL entry → `Unauthenticated` ("disallowed method")
//!
//! Unknown consumers and consumers lacking a permission are indistinguishable
//! on the wire.

use std::sync::Arc;

use http::HeaderMap;
use tonic::{Request, Status};

use crate::acl::{AclTable, FullMethod, ServiceGroup};
use crate::hub::{AuditEvent, StatSnapshot, SubscriberRegistry, TelemetryHub};

/// Metadata key identifying the caller
pub const CONSUMER_HEADER: &str = "consumer";

/// Authorization failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing consumer metadata")]
    MissingConsumer,

    #[error("invalid method name {0:?}")]
    InvalidMethod(String),

    #[error("unknown service {0:?}")]
    UnknownService(String),

    #[error("consumer {consumer:?} may not call {method:?}")]
    Disallowed { consumer: String, method: String },
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingConsumer => Status::unauthenticated("disallowed method"),
            AuthError::InvalidMethod(name) => {
                Status::invalid_argument(format!("invalid method name {name:?}"))
            }
            AuthError::UnknownService(_) => Status::unknown("unknown service"),
            AuthError::Disallowed { .. } => Status::unauthenticated("disallowed method"),
        }
    }
}

/// Capabilities a service implementation exposes to the authorization layer
///
/// The interceptor resolves the ACL table through this trait instead of
/// inspecting the concrete service type.
pub trait Governed: Send + Sync + 'static {
    /// Service group this implementation serves
    fn service_group(&self) -> ServiceGroup;

    /// ACL table authorizing calls to this implementation
    fn acl_table(&self) -> &AclTable;

    /// Telemetry hub receiving this implementation's call records
    fn telemetry(&self) -> &Arc<TelemetryHub>;

    /// Whether this implementation has a handler for the bare method name
    fn serves(&self, method: &str) -> bool {
        self.service_group().methods().contains(&method)
    }

    fn log_registry(&self) -> &Arc<SubscriberRegistry<AuditEvent>> {
        self.telemetry().logs()
    }

    fn stat_registry(&self) -> &Arc<SubscriberRegistry<StatSnapshot>> {
        self.telemetry().stats()
    }
}

/// Identity attached to a request once it has been authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedCall {
    pub consumer: String,
    /// Full method name, e.g. `/logger.Biz/Check`
    pub method: String,
    /// Caller address as `ip:port`
    pub host: String,
}

/// Read the consumer from request metadata
pub fn consumer_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONSUMER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Authorize a call to `path` against `governed`, returning the consumer
pub fn authorize<'a, G>(
    governed: &G,
    headers: &'a HeaderMap,
    path: &str,
) -> Result<&'a str, AuthError>
where
    G: Governed + ?Sized,
{
    let consumer = consumer_from_headers(headers).ok_or(AuthError::MissingConsumer)?;

    let method =
        FullMethod::parse(path).map_err(|_| AuthError::InvalidMethod(path.to_string()))?;

    let group = ServiceGroup::from_service_name(method.service)
        .filter(|group| *group == governed.service_group())
        .ok_or_else(|| AuthError::UnknownService(method.service.to_string()))?;

    if !governed
        .acl_table()
        .lookup(consumer, group.service_name(), method.method)
    {
        return Err(AuthError::Disallowed {
            consumer: consumer.to_string(),
            method: path.to_string(),
        });
    }

    Ok(consumer)
}

/// Extension trait to get the authorized caller from a gRPC request
pub trait AuthorizedCallExt {
    fn authorized_call(&self) -> Option<&AuthorizedCall>;

    /// Consumer of an authorized call, falling back to raw metadata
    fn consumer(&self) -> Option<String>;
}

impl<T> AuthorizedCallExt for Request<T> {
    fn authorized_call(&self) -> Option<&AuthorizedCall> {
        self.extensions().get::<AuthorizedCall>()
    }

    fn consumer(&self) -> Option<String> {
        if let Some(call) = self.authorized_call() {
            return Some(call.consumer.clone());
        }
        self.metadata()
            .get(CONSUMER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}
