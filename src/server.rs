//! Server bootstrap for async-logger.
//!
//! This module wires together:
//! - configuration
//! - the ACL tables and telemetry hub
//! - the Biz and Admin gRPC services behind the ACL layer
//! - the optional Axum health and metrics router

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tower::Layer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::acl::AclTables;
use crate::grpc::{AclLayer, AdminService, BizService};
use crate::hub::{Emitter, TelemetryHub};
use crate::metrics::MetricsRegistry;
use crate::proto::{admin_server::AdminServer, biz_server::BizServer};
use crate::shutdown::{shutdown_signal, ShutdownCoordinator};
use crate::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8082;

/// Configuration error, fatal at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no ACL configured; set ACL_DATA or ACL_FILE")]
    MissingAcl,

    #[error("failed to read ACL file {path:?}: {source}")]
    ReadAcl {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid listen address {0:?}")]
    InvalidAddr(String),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Where the ACL payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclSource {
    Inline(String),
    File(PathBuf),
}

impl AclSource {
    pub fn load(&self) -> Result<String, ConfigError> {
        match self {
            AclSource::Inline(payload) => Ok(payload.clone()),
            AclSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::ReadAcl {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// gRPC listen address. Port 0 picks an ephemeral port.
    pub listen_addr: SocketAddr,
    /// Health and metrics listen address; disabled when `None`.
    pub http_addr: Option<SocketAddr>,
    pub acl: Option<AclSource>,
    /// Capacity of the queue between the interceptor and the emitter.
    pub emission_queue_capacity: usize,
    /// Capacity of each subscriber's queue.
    pub subscriber_queue_capacity: usize,
    /// Upper bound for each shutdown phase.
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            http_addr: None,
            acl: None,
            emission_queue_capacity: 1024,
            subscriber_queue_capacity: 256,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let listen_addr = parse_addr(&format!("{host}:{port}"))?;

        let http_addr = lookup("HTTP_ADDR")
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_addr(v.trim()))
            .transpose()?;

        let acl = match (lookup("ACL_DATA"), lookup("ACL_FILE")) {
            (Some(data), _) => Some(AclSource::Inline(data)),
            (None, Some(path)) => Some(AclSource::File(PathBuf::from(path))),
            (None, None) => None,
        };

        let shutdown_secs = parse_var(
            &lookup,
            "SHUTDOWN_TIMEOUT_SECS",
            defaults.shutdown_timeout.as_secs(),
        )?;

        Ok(Self {
            listen_addr,
            http_addr,
            acl,
            emission_queue_capacity: parse_var(
                &lookup,
                "EMISSION_QUEUE_CAPACITY",
                defaults.emission_queue_capacity,
            )?,
            subscriber_queue_capacity: parse_var(
                &lookup,
                "SUBSCRIBER_QUEUE_CAPACITY",
                defaults.subscriber_queue_capacity,
            )?,
            shutdown_timeout: Duration::from_secs(shutdown_secs),
        })
    }

    /// Read the configured ACL payload
    pub fn load_acl(&self) -> Result<String, ConfigError> {
        self.acl.as_ref().ok_or(ConfigError::MissingAcl)?.load()
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

fn parse_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidAddr(value.to_string()))
}

/// Handle to a started server
pub struct RunningServer {
    local_addr: SocketAddr,
    http_addr: Option<SocketAddr>,
    hub: Arc<TelemetryHub>,
    coordinator: Arc<ShutdownCoordinator>,
    grpc: JoinHandle<Result<(), tonic::transport::Error>>,
    http: Option<JoinHandle<std::io::Result<()>>>,
    emitter: Emitter,
    shutdown_timeout: Duration,
}

impl RunningServer {
    /// Bound gRPC address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Bound HTTP address, if the health and metrics server is enabled
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http_addr
    }

    pub fn hub(&self) -> &Arc<TelemetryHub> {
        &self.hub
    }

    /// Stop streaming endpoints, stop the servers, then drain the emitter
    pub async fn shutdown(self) -> anyhow::Result<()> {
        if !self
            .coordinator
            .graceful_shutdown(self.shutdown_timeout)
            .await
        {
            warn!("Some streams were still open at shutdown");
        }

        let grpc = join_within("gRPC server", self.grpc, self.shutdown_timeout).await;
        let http = match self.http {
            Some(handle) => join_within("HTTP server", handle, self.shutdown_timeout).await,
            None => Ok(()),
        };

        // servers are down, nothing publishes any more
        self.emitter.shutdown().await;
        info!("async-logger stopped");

        grpc.and(http)
    }
}

async fn join_within<E>(
    name: &'static str,
    mut handle: JoinHandle<Result<(), E>>,
    timeout: Duration,
) -> anyhow::Result<()>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(joined) => joined
            .with_context(|| format!("{name} task failed"))?
            .with_context(|| format!("{name} failed")),
        Err(_) => {
            warn!(server = name, "Server did not stop in time, aborting");
            handle.abort();
            Ok(())
        }
    }
}

/// Parse the ACL, bind the listeners, and start serving.
///
/// An invalid ACL aborts startup before any socket is bound.
pub async fn start(config: Config, acl_payload: &str) -> anyhow::Result<RunningServer> {
    let acl = Arc::new(AclTables::parse(acl_payload).context("invalid ACL configuration")?);
    info!(
        business_consumers = acl.business.consumer_count(),
        admin_consumers = acl.admin.consumer_count(),
        "ACL loaded"
    );

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind gRPC listener on {}", config.listen_addr))?;
    let local_addr = listener.local_addr()?;

    let http_listener = match config.http_addr {
        Some(addr) => Some(
            TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind HTTP listener on {addr}"))?,
        ),
        None => None,
    };

    let metrics = Arc::new(MetricsRegistry::new());
    let hub = Arc::new(TelemetryHub::new(
        config.subscriber_queue_capacity,
        metrics,
    ));
    let coordinator = Arc::new(ShutdownCoordinator::new());
    let (publisher, emitter) = Emitter::spawn(hub.clone(), config.emission_queue_capacity);

    let biz = Arc::new(BizService::new(acl.clone(), hub.clone()));
    let admin = Arc::new(AdminService::new(
        acl,
        hub.clone(),
        publisher.clone(),
        coordinator.signal(),
        coordinator.stream_tracker(),
    ));

    let biz_service = AclLayer::new(biz.clone(), publisher.clone()).layer(BizServer::from_arc(biz));
    let admin_service = AclLayer::new(admin.clone(), publisher).layer(AdminServer::from_arc(admin));

    let grpc_signal = coordinator.signal();
    let grpc = tokio::spawn(
        Server::builder()
            .layer(TraceLayer::new_for_grpc())
            .add_service(biz_service)
            .add_service(admin_service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                grpc_signal.wait().await
            }),
    );
    info!(addr = %local_addr, "gRPC server listening");

    let (http_addr, http) = match http_listener {
        Some(listener) => {
            let addr = listener.local_addr()?;
            let signal = coordinator.signal();
            let app = router(hub.clone());
            let handle = tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move { signal.wait().await })
                    .await
            });
            info!(addr = %addr, "HTTP server listening");
            (Some(addr), Some(handle))
        }
        None => (None, None),
    };

    Ok(RunningServer {
        local_addr,
        http_addr,
        hub,
        coordinator,
        grpc,
        http,
        emitter,
        shutdown_timeout: config.shutdown_timeout,
    })
}

/// Binary entry point: serve until Ctrl+C or SIGTERM.
pub async fn run() -> anyhow::Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry)
        .map_err(|e| anyhow::anyhow!("failed to initialize telemetry: {e}"))?;

    info!("Starting async-logger v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let acl_payload = config.load_acl()?;
    info!(
        listen_addr = %config.listen_addr,
        http_addr = ?config.http_addr,
        emission_queue_capacity = config.emission_queue_capacity,
        subscriber_queue_capacity = config.subscriber_queue_capacity,
        "Configuration loaded"
    );

    let server = start(config, &acl_payload).await?;
    info!("async-logger is ready to accept connections");

    shutdown_signal().await;
    let result = server.shutdown().await;

    shutdown_telemetry();
    result
}

fn router(hub: Arc<TelemetryHub>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    log_subscribers: usize,
    stat_subscribers: usize,
    metrics: serde_json::Value,
}

/// Health check endpoint.
async fn health_check(State(hub): State<Arc<TelemetryHub>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "async-logger",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: hub.metrics().uptime_seconds(),
        log_subscribers: hub.logs().len(),
        stat_subscribers: hub.stats().len(),
        metrics: hub.metrics().to_json(),
    })
}

/// Prometheus scrape endpoint.
async fn metrics(State(hub): State<Arc<TelemetryHub>>) -> impl IntoResponse {
    hub.record_gauges();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        hub.metrics().to_prometheus(),
    )
}
