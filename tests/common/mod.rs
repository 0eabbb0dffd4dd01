//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::time::Duration;

use async_logger::proto::admin_client::AdminClient;
use async_logger::proto::biz_client::BizClient;
use async_logger::proto::Nothing;
use async_logger::{start, Config, RunningServer, CONSUMER_HEADER};
use http::uri::PathAndQuery;
use tonic::codec::ProstCodec;
use tonic::transport::Channel;
use tonic::{Request, Streaming};

/// ACL used by most tests
pub const ACL: &str = r#"{
    "logger1": ["/logger.Admin/Logging"],
    "logger2": ["/logger.Admin/Logging"],
    "stat1": ["/logger.Admin/Statistics"],
    "stat2": ["/logger.Admin/Statistics"],
    "biz_user": ["/logger.Biz/Check", "/logger.Biz/Add"],
    "biz_admin": ["/logger.Biz/*"]
}"#;

pub const CHECK: &str = "/logger.Biz/Check";
pub const ADD: &str = "/logger.Biz/Add";
pub const TEST: &str = "/logger.Biz/Test";

/// Upper bound for any single wait in a test
pub const WAIT: Duration = Duration::from_secs(5);

/// Start a server on an ephemeral port
pub async fn start_server(acl: &str) -> RunningServer {
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        shutdown_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    start(config, acl).await.expect("server should start")
}

fn endpoint(server: &RunningServer) -> String {
    format!("http://{}", server.local_addr())
}

pub async fn biz_client(server: &RunningServer) -> BizClient<Channel> {
    BizClient::connect(endpoint(server)).await.unwrap()
}

pub async fn admin_client(server: &RunningServer) -> AdminClient<Channel> {
    AdminClient::connect(endpoint(server)).await.unwrap()
}

/// Unary call to any path, including ones no generated client exposes
pub async fn raw_unary(
    server: &RunningServer,
    path: &'static str,
    consumer: &str,
) -> Result<Nothing, tonic::Status> {
    let channel = Channel::from_shared(endpoint(server))
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready().await.unwrap();

    let codec: ProstCodec<Nothing, Nothing> = ProstCodec::default();
    grpc.unary(nothing(consumer), PathAndQuery::from_static(path), codec)
        .await
        .map(|response| response.into_inner())
}

/// Wrap `message` in a request carrying the `consumer` metadata
pub fn with_consumer<T>(message: T, consumer: &str) -> Request<T> {
    let mut request = Request::new(message);
    request
        .metadata_mut()
        .insert(CONSUMER_HEADER, consumer.parse().unwrap());
    request
}

pub fn nothing(consumer: &str) -> Request<Nothing> {
    with_consumer(Nothing::default(), consumer)
}

/// Next stream message, failing the test after [`WAIT`]
pub async fn next<T>(stream: &mut Streaming<T>) -> Option<T> {
    tokio::time::timeout(WAIT, stream.message())
        .await
        .expect("timed out waiting for stream message")
        .expect("stream failed")
}

/// Poll `condition` until it holds, failing the test after [`WAIT`]
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Status of a call that must have been rejected
pub fn rejected<T>(result: Result<T, tonic::Status>) -> tonic::Status {
    match result {
        Ok(_) => panic!("call should have been rejected"),
        Err(status) => status,
    }
}
