//! End-to-end tests of the HTTP transport against a local collector stub.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::any;
use axum::Router;
use lumber_sender::client::{ClientError, Envelope, HttpTransport, LumberClient, TransportOptions};
use lumber_sender::driver::{run, RunConfig};
use lumber_sender::generator::{GeneratorConfig, Pattern, TrafficGenerator};
use lumber_sender::record::{Level, LogMessage, Metadata};
use tokio::net::TcpListener;

/// A request seen by the stub collector.
#[derive(Debug, Clone)]
struct Captured {
    method: String,
    body: Vec<u8>,
}

type Requests = Arc<Mutex<Vec<Captured>>>;

#[derive(Clone)]
struct StubCollector {
    requests: Requests,
    status: StatusCode,
    reply: &'static str,
}

async fn ingest(
    State(stub): State<StubCollector>,
    method: Method,
    body: Bytes,
) -> (StatusCode, &'static str) {
    stub.requests.lock().unwrap().push(Captured {
        method: method.to_string(),
        body: body.to_vec(),
    });
    (stub.status, stub.reply)
}

/// Start a stub collector answering every request with `status` and `reply`.
async fn spawn_collector(status: u16, reply: &'static str) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));

    let stub = StubCollector {
        requests: requests.clone(),
        status: StatusCode::from_u16(status).unwrap(),
        reply,
    };
    let router = Router::new().route("/", any(ingest)).with_state(stub);

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    (address, requests)
}

fn options() -> TransportOptions {
    TransportOptions {
        timeout: Duration::from_secs(5),
    }
}

fn posted_batches(requests: &Requests) -> Vec<Vec<Envelope>> {
    requests
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.method == "POST")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_connect_checks_collector() {
    let (address, requests) = spawn_collector(200, "").await;

    let client: LumberClient<HttpTransport> =
        LumberClient::connect(&address, &options()).await.unwrap();

    assert_eq!(client.address(), address);
    assert_eq!(
        client.transport().url().as_str(),
        format!("http://{}/", address)
    );
    let seen = requests.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "HEAD");
}

#[tokio::test]
async fn test_connect_accepts_non_success_answer() {
    let (address, _requests) = spawn_collector(405, "").await;

    let result: Result<LumberClient<HttpTransport>, _> =
        LumberClient::connect(&address, &options()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result: Result<LumberClient<HttpTransport>, _> =
        LumberClient::connect(&address, &options()).await;

    match result {
        Err(ClientError::Connect { address: failed, .. }) => assert_eq!(failed, address),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("connect should fail with nothing listening"),
    }
}

#[tokio::test]
async fn test_send_posts_envelope_array() {
    let (address, requests) = spawn_collector(200, "ok").await;
    let mut client: LumberClient<HttpTransport> =
        LumberClient::connect(&address, &options()).await.unwrap();

    let record = LogMessage::new(Level::Warn, "stub-test", "hello collector", Metadata::new());
    let acked = client.send(&record).await.unwrap();
    assert_eq!(acked, 1);

    let batches = posted_batches(&requests);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);

    let inner: LogMessage = serde_json::from_str(&batches[0][0].message).unwrap();
    assert_eq!(inner, record);
    assert!(batches[0][0].timestamp >= record.timestamp);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_send_batch_acknowledges_all() {
    let (address, requests) = spawn_collector(200, "").await;
    let mut client: LumberClient<HttpTransport> =
        LumberClient::connect(&address, &options()).await.unwrap();

    let records: Vec<LogMessage> = (0..4)
        .map(|i| LogMessage::new(Level::Info, "stub-test", format!("msg {}", i), Metadata::new()))
        .collect();

    assert_eq!(client.send_batch(&records).await.unwrap(), 4);

    let batches = posted_batches(&requests);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 4);
}

#[tokio::test]
async fn test_rejected_batch_surfaces_status() {
    let (address, _requests) = spawn_collector(503, "overloaded").await;
    let mut client: LumberClient<HttpTransport> =
        LumberClient::connect(&address, &options()).await.unwrap();

    let record = LogMessage::new(Level::Info, "stub-test", "nope", Metadata::new());
    let err = client.send(&record).await.unwrap_err();

    match err {
        ClientError::Status { code, message } => {
            assert_eq!(code, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_driver_run_against_collector() {
    let (address, requests) = spawn_collector(200, "").await;
    let mut client: LumberClient<HttpTransport> =
        LumberClient::connect(&address, &options()).await.unwrap();
    let mut generator =
        TrafficGenerator::with_seed(GeneratorConfig::with_pattern(Pattern::Mixed), 99);
    let config = RunConfig {
        count: 6,
        interval: Duration::from_millis(5),
    };

    let summary = run(&mut client, &mut generator, &config).await;

    assert_eq!(summary.sent, 6);
    assert_eq!(summary.acknowledged, 6);
    assert_eq!(posted_batches(&requests).len(), 6);
}
