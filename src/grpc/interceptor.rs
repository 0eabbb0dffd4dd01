//! gRPC authorization interceptor
//!
//! A `tower` layer wrapped around each generated service. Unlike a tonic
//! `Interceptor`, it sees the request path, so the same check covers unary
//! and streaming methods.
//!
//! Paths naming a method the service does not implement bypass the check and
//! go straight to the generated router, which answers `Unimplemented`. No
//! handler runs for them, so nothing is published.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{header, HeaderValue, Request, Response};
use tonic::body::{empty_body, BoxBody};
use tonic::server::NamedService;
use tonic::transport::server::TcpConnectInfo;
use tonic::Status;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::acl::FullMethod;
use crate::auth::{authorize, consumer_from_headers, AuthorizedCall, Governed};
use crate::hub::{CallRecord, Publisher};
use crate::metrics::metric_names;

/// Host recorded when the transport exposes no peer address
pub const UNKNOWN_HOST: &str = "unknown";

/// Layer authorizing calls to a service governed by `G`
pub struct AclLayer<G> {
    governed: Arc<G>,
    publisher: Publisher,
}

impl<G> AclLayer<G> {
    pub fn new(governed: Arc<G>, publisher: Publisher) -> Self {
        Self {
            governed,
            publisher,
        }
    }
}

impl<G> Clone for AclLayer<G> {
    fn clone(&self) -> Self {
        Self {
            governed: self.governed.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

impl<S, G> Layer<S> for AclLayer<G> {
    type Service = AclService<S, G>;

    fn layer(&self, inner: S) -> Self::Service {
        AclService {
            inner,
            governed: self.governed.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Service produced by [`AclLayer`]
pub struct AclService<S, G> {
    inner: S,
    governed: Arc<G>,
    publisher: Publisher,
}

impl<S: Clone, G> Clone for AclService<S, G> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            governed: self.governed.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

impl<S: NamedService, G> NamedService for AclService<S, G> {
    const NAME: &'static str = S::NAME;
}

impl<S, G, B> Service<Request<B>> for AclService<S, G>
where
    S: Service<Request<B>, Response = Response<BoxBody>, Error = Infallible>,
    S::Future: Send + 'static,
    G: Governed,
{
    type Response = Response<BoxBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        if is_unimplemented(self.governed.as_ref(), req.uri().path()) {
            debug!(method = %req.uri().path(), "Unimplemented method, not authorized");
            return Box::pin(self.inner.call(req));
        }

        match admit(self.governed.as_ref(), &self.publisher, &mut req) {
            Ok(()) => Box::pin(self.inner.call(req)),
            Err(status) => Box::pin(async move { Ok(reject(&status)) }),
        }
    }
}

/// True for a well-formed path into this service naming a method it lacks
fn is_unimplemented<G>(governed: &G, path: &str) -> bool
where
    G: Governed + ?Sized,
{
    match FullMethod::parse(path) {
        Ok(method) => {
            method.service == governed.service_group().service_name()
                && !governed.serves(method.method)
        }
        Err(_) => false,
    }
}

/// Authorize `req`, attach the caller identity, and publish the call
fn admit<G, B>(governed: &G, publisher: &Publisher, req: &mut Request<B>) -> Result<(), Status>
where
    G: Governed + ?Sized,
{
    let metrics = governed.telemetry().metrics();
    let path = req.uri().path().to_string();

    let consumer = match authorize(governed, req.headers(), &path) {
        Ok(consumer) => consumer.to_string(),
        Err(e) => {
            metrics.inc_counter(metric_names::CALLS_DENIED);
            warn!(
                consumer = consumer_from_headers(req.headers()).unwrap_or_default(),
                method = %path,
                error = %e,
                "Call rejected"
            );
            return Err(e.into());
        }
    };

    let host = peer_addr(req)
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string());

    metrics.inc_counter(metric_names::CALLS_AUTHORIZED);
    debug!(consumer = %consumer, method = %path, host = %host, "Call authorized");

    publisher.publish(CallRecord {
        consumer: consumer.clone(),
        method: path.clone(),
        host: host.clone(),
    });

    req.extensions_mut().insert(AuthorizedCall {
        consumer,
        method: path,
        host,
    });

    Ok(())
}

fn peer_addr<B>(req: &Request<B>) -> Option<SocketAddr> {
    req.extensions()
        .get::<TcpConnectInfo>()
        .and_then(|info| info.remote_addr())
}

/// Trailers-only gRPC response carrying `status`
fn reject(status: &Status) -> Response<BoxBody> {
    let mut response = Response::new(empty_body());
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/grpc"),
    );
    headers.insert("grpc-status", HeaderValue::from(status.code() as i32));
    if let Ok(message) = HeaderValue::from_str(status.message()) {
        headers.insert("grpc-message", message);
    }
    response
}
