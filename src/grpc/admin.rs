//! gRPC Admin service implementation
//!
//! `Logging` relays audit events of other consumers' calls. `Statistics`
//! aggregates call increments per subscriber and flushes them on a timer. A
//! stat window opens only after the subscriber's own call has been emitted,
//! so that call is never counted in it.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::{Request, Response, Status};
use tracing::{debug, info, info_span, Instrument};

use crate::acl::{AclTable, AclTables, ServiceGroup};
use crate::auth::{AuthorizedCallExt, Governed};
use crate::hub::{
    AuditEvent, Publisher, StatAggregator, StatSnapshot, Subscription, TelemetryHub,
};
use crate::proto::{admin_server::Admin, Event, Nothing, Stat, StatInterval};
use crate::shutdown::{ShutdownSignal, StreamGuard, StreamTracker};
use crate::telemetry::spans;

/// Outbound buffer between a relay task and its response stream
const OUTBOUND_BUFFER: usize = 16;

fn to_proto_event(event: AuditEvent) -> Event {
    Event {
        timestamp: event.timestamp,
        consumer: event.consumer,
        method: event.method,
        host: event.host,
    }
}

fn to_proto_stat(snapshot: StatSnapshot, timestamp: i64) -> Stat {
    Stat {
        timestamp,
        by_method: snapshot.by_method,
        by_consumer: snapshot.by_consumer,
    }
}

/// gRPC Admin service implementation
pub struct AdminService {
    acl: Arc<AclTables>,
    hub: Arc<TelemetryHub>,
    publisher: Publisher,
    shutdown: ShutdownSignal,
    streams: Arc<StreamTracker>,
}

impl AdminService {
    pub fn new(
        acl: Arc<AclTables>,
        hub: Arc<TelemetryHub>,
        publisher: Publisher,
        shutdown: ShutdownSignal,
        streams: Arc<StreamTracker>,
    ) -> Self {
        Self {
            acl,
            hub,
            publisher,
            shutdown,
            streams,
        }
    }
}

impl Governed for AdminService {
    fn service_group(&self) -> ServiceGroup {
        ServiceGroup::Admin
    }

    fn acl_table(&self) -> &AclTable {
        &self.acl.admin
    }

    fn telemetry(&self) -> &Arc<TelemetryHub> {
        &self.hub
    }
}

#[tonic::async_trait]
impl Admin for AdminService {
    type LoggingStream = Pin<Box<dyn Stream<Item = Result<Event, Status>> + Send>>;

    /// Stream audit events for calls made by other consumers
    async fn logging(
        &self,
        request: Request<Nothing>,
    ) -> Result<Response<Self::LoggingStream>, Status> {
        let consumer = request
            .consumer()
            .ok_or_else(|| Status::internal("consumer missing on authorized call"))?;

        let subscription = self.log_registry().subscribe();
        let subscriber_id = subscription.id();
        let guard = self.streams.stream_start();
        let shutdown = self.shutdown.clone();

        info!(consumer = %consumer, subscriber_id = %subscriber_id, "Log subscriber registered");

        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let span = info_span!(spans::LOG_RELAY, %consumer, %subscriber_id);

        tokio::spawn(
            relay_logs(consumer, subscription, tx, shutdown, guard).instrument(span),
        );

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    type StatisticsStream = Pin<Box<dyn Stream<Item = Result<Stat, Status>> + Send>>;

    /// Stream call counters aggregated over `interval_seconds` windows
    async fn statistics(
        &self,
        request: Request<StatInterval>,
    ) -> Result<Response<Self::StatisticsStream>, Status> {
        let consumer = request
            .consumer()
            .ok_or_else(|| Status::internal("consumer missing on authorized call"))?;
        let interval_seconds = request.get_ref().interval_seconds;

        if interval_seconds == 0 {
            return Err(Status::invalid_argument("interval_seconds must be positive"));
        }
        let period = Duration::from_secs(interval_seconds);
        let first_flush = Instant::now()
            .checked_add(period)
            .ok_or_else(|| Status::invalid_argument("interval_seconds out of range"))?;

        // the interceptor queued this call before the handler ran
        if !self.publisher.flush().await {
            return Err(Status::unavailable("server is shutting down"));
        }

        let subscription = self.stat_registry().subscribe();
        let subscriber_id = subscription.id();
        let guard = self.streams.stream_start();
        let shutdown = self.shutdown.clone();

        info!(
            consumer = %consumer,
            subscriber_id = %subscriber_id,
            interval_seconds,
            "Stat subscriber registered"
        );

        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let span = info_span!(spans::STAT_RELAY, %consumer, %subscriber_id, interval_seconds);

        tokio::spawn(
            relay_stats(subscription, first_flush, period, tx, shutdown, guard).instrument(span),
        );

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}

/// Forward other consumers' audit events until the stream ends
async fn relay_logs(
    consumer: String,
    mut subscription: Subscription<AuditEvent>,
    tx: mpsc::Sender<Result<Event, Status>>,
    shutdown: ShutdownSignal,
    _guard: StreamGuard,
) {
    let mut relayed = 0u64;

    loop {
        tokio::select! {
            _ = tx.closed() => break,
            _ = shutdown.wait() => break,
            event = subscription.recv() => {
                let Some(event) = event else { break };
                // a subscriber never sees its own calls
                if event.consumer == consumer {
                    continue;
                }
                if tx.send(Ok(to_proto_event(event))).await.is_err() {
                    break;
                }
                relayed += 1;
            }
        }
    }

    drop(subscription);
    info!(relayed, "Log subscriber closed");
}

/// Merge increments into a private window and flush it on every tick
async fn relay_stats(
    mut subscription: Subscription<StatSnapshot>,
    first_flush: Instant,
    period: Duration,
    tx: mpsc::Sender<Result<Stat, Status>>,
    shutdown: ShutdownSignal,
    _guard: StreamGuard,
) {
    let aggregator = StatAggregator::new();
    let mut ticker = tokio::time::interval_at(first_flush, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tx.closed() => break,
            _ = shutdown.wait() => break,
            increment = subscription.recv() => match increment {
                Some(increment) => aggregator.merge(&increment),
                None => break,
            },
            _ = ticker.tick() => {
                let window = aggregator.take();
                debug!(calls = window.total_calls(), "Flushing stat window");
                let stat = to_proto_stat(window, chrono::Utc::now().timestamp());
                if tx.send(Ok(stat)).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(subscription);
    info!("Stat subscriber closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthorizedCall;
    use crate::hub::{CallRecord, Emitter};
    use crate::metrics::MetricsRegistry;
    use crate::shutdown::ShutdownCoordinator;
    use tokio_stream::StreamExt;

    struct Fixture {
        svc: AdminService,
        hub: Arc<TelemetryHub>,
        publisher: Publisher,
        _emitter: Emitter,
    }

    fn service(coordinator: &ShutdownCoordinator) -> Fixture {
        let hub = Arc::new(TelemetryHub::new(16, Arc::new(MetricsRegistry::new())));
        let acl = Arc::new(AclTables::parse(r#"{"ops": ["/logger.Admin/*"]}"#).unwrap());
        let (publisher, emitter) = Emitter::spawn(hub.clone(), 16);
        let svc = AdminService::new(
            acl,
            hub.clone(),
            publisher.clone(),
            coordinator.signal(),
            coordinator.stream_tracker(),
        );
        Fixture {
            svc,
            hub,
            publisher,
            _emitter: emitter,
        }
    }

    fn as_consumer<T>(message: T, consumer: &str) -> Request<T> {
        let mut request = Request::new(message);
        request.extensions_mut().insert(AuthorizedCall {
            consumer: consumer.to_string(),
            method: "/logger.Admin/Logging".to_string(),
            host: "127.0.0.1:1".to_string(),
        });
        request
    }

    fn call(consumer: &str, method: &str) -> CallRecord {
        CallRecord {
            consumer: consumer.to_string(),
            method: method.to_string(),
            host: "127.0.0.1:2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_logging_skips_own_calls() {
        let coordinator = ShutdownCoordinator::new();
        let Fixture {
            svc,
            hub,
            _emitter,
            ..
        } = service(&coordinator);

        let mut stream = svc
            .logging(as_consumer(Nothing::default(), "ops"))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(hub.logs().len(), 1);

        hub.emit(call("ops", "/logger.Admin/Logging"));
        hub.emit(call("alice", "/logger.Biz/Check"));

        let event = stream.next().await.unwrap().unwrap();
        assert_eq!(event.consumer, "alice");
        assert_eq!(event.method, "/logger.Biz/Check");
        assert_eq!(event.host, "127.0.0.1:2");
    }

    #[tokio::test]
    async fn test_logging_deregisters_on_disconnect() {
        let coordinator = ShutdownCoordinator::new();
        let Fixture {
            svc,
            hub,
            _emitter,
            ..
        } = service(&coordinator);

        let stream = svc
            .logging(as_consumer(Nothing::default(), "ops"))
            .await
            .unwrap()
            .into_inner();
        drop(stream);

        let tracker = coordinator.stream_tracker();
        assert!(tracker.wait_for_drain(Duration::from_secs(1)).await);
        assert!(hub.logs().is_empty());
    }

    #[tokio::test]
    async fn test_logging_requires_consumer() {
        let coordinator = ShutdownCoordinator::new();
        let Fixture {
            svc,
            hub,
            _emitter,
            ..
        } = service(&coordinator);

        let status = svc
            .logging(Request::new(Nothing::default()))
            .await
            .err()
            .unwrap();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(hub.logs().is_empty());
    }

    #[tokio::test]
    async fn test_statistics_rejects_zero_interval() {
        let coordinator = ShutdownCoordinator::new();
        let Fixture {
            svc,
            hub,
            _emitter,
            ..
        } = service(&coordinator);

        let status = svc
            .statistics(as_consumer(StatInterval { interval_seconds: 0 }, "ops"))
            .await
            .err()
            .unwrap();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(hub.stats().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_statistics_flushes_and_resets_each_window() {
        let coordinator = ShutdownCoordinator::new();
        let Fixture {
            svc,
            hub,
            _emitter,
            ..
        } = service(&coordinator);

        let mut stream = svc
            .statistics(as_consumer(StatInterval { interval_seconds: 2 }, "ops"))
            .await
            .unwrap()
            .into_inner();

        hub.emit(call("alice", "/logger.Biz/Check"));
        hub.emit(call("alice", "/logger.Biz/Check"));
        hub.emit(call("bob", "/logger.Biz/Add"));

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.by_method.get("/logger.Biz/Check"), Some(&2));
        assert_eq!(first.by_method.get("/logger.Biz/Add"), Some(&1));
        assert_eq!(first.by_consumer.get("alice"), Some(&2));
        assert_eq!(first.by_consumer.get("bob"), Some(&1));

        let second = stream.next().await.unwrap().unwrap();
        assert!(second.by_method.is_empty());
        assert!(second.by_consumer.is_empty());

        hub.emit(call("carol", "/logger.Biz/Test"));
        let third = stream.next().await.unwrap().unwrap();
        assert_eq!(third.by_method.len(), 1);
        assert_eq!(third.by_consumer.get("carol"), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_statistics_window_excludes_own_call() {
        let coordinator = ShutdownCoordinator::new();
        let Fixture {
            svc,
            publisher,
            _emitter,
            ..
        } = service(&coordinator);

        // the interceptor publishes before the handler runs
        publisher.publish(call("ops", "/logger.Admin/Statistics"));
        let mut stream = svc
            .statistics(as_consumer(StatInterval { interval_seconds: 1 }, "ops"))
            .await
            .unwrap()
            .into_inner();
        publisher.publish(call("alice", "/logger.Biz/Check"));

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.by_consumer.get("ops"), None);
        assert_eq!(first.by_method.get("/logger.Admin/Statistics"), None);
        assert_eq!(first.by_consumer.get("alice"), Some(&1));
    }

    #[tokio::test]
    async fn test_shutdown_ends_streams() {
        let coordinator = ShutdownCoordinator::new();
        let Fixture {
            svc,
            hub,
            _emitter,
            ..
        } = service(&coordinator);

        let mut logs = svc
            .logging(as_consumer(Nothing::default(), "ops"))
            .await
            .unwrap()
            .into_inner();
        let mut stats = svc
            .statistics(as_consumer(StatInterval { interval_seconds: 60 }, "ops"))
            .await
            .unwrap()
            .into_inner();

        assert!(coordinator.graceful_shutdown(Duration::from_secs(1)).await);
        assert!(logs.next().await.is_none());
        assert!(stats.next().await.is_none());
        assert!(hub.logs().is_empty());
        assert!(hub.stats().is_empty());
    }
}
