//! End-to-end tests against a mock HTTP server.

use eventsource::prelude::*;
use eventsource::{LAST_EVENT_ID, ReadError};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Received = std::result::Result<OwnedMessage, EventSourceError>;

const WAIT: Duration = Duration::from_secs(5);

fn event_stream(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

fn start(config: EventSourceConfig) -> (EventSource, UnboundedReceiver<Received>) {
    let (tx, rx) = unbounded_channel();
    let source = EventSource::new(config, move |result| {
        let _ = tx.send(result.map(OwnedMessage::from));
    })
    .unwrap();
    (source, rx)
}

async fn next(rx: &mut UnboundedReceiver<Received>) -> Received {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for callback")
        .expect("event source hung up")
}

fn data(message: &OwnedMessage) -> Option<&str> {
    message.as_message().data_str()
}

#[tokio::test]
async fn test_receives_messages_and_resumes_with_last_event_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(event_stream("id: 1\nevent: greeting\ndata: hello\n\n"))
        .mount(&server)
        .await;

    let config = EventSourceConfig::new(format!("{}/events", server.uri()))
        .reconnect_delay(Duration::from_millis(10));
    let (source, mut rx) = start(config);

    let first = next(&mut rx).await.unwrap();
    assert_eq!(first.as_message().id_str(), Some("1"));
    assert_eq!(first.as_message().event_str(), Some("greeting"));
    assert_eq!(data(&first), Some("hello"));

    let second = next(&mut rx).await.unwrap();
    assert_eq!(second, first);
    source.close().await;

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 2);
    assert_eq!(requests[0].headers["accept"], "text/event-stream");
    assert!(requests[0].headers.get(LAST_EVENT_ID.as_str()).is_none());
    assert_eq!(requests[1].headers[LAST_EVENT_ID.as_str()], "1");
}

#[tokio::test]
async fn test_invalid_status_is_reported_and_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config =
        EventSourceConfig::new(server.uri()).reconnect_delay(Duration::from_millis(10));
    let (source, mut rx) = start(config);

    for _ in 0..2 {
        let err = next(&mut rx).await.unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
        assert!(err.is_recoverable());
    }
    source.close().await;
}

#[tokio::test]
async fn test_invalid_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let (source, mut rx) = start(EventSourceConfig::new(server.uri()));

    let err = next(&mut rx).await.unwrap_err();
    assert!(matches!(
        err,
        EventSourceError::InvalidContentType(Some(ref ct)) if ct == "application/json"
    ));
    source.close().await;
}

#[tokio::test]
async fn test_server_retry_sets_reconnect_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(event_stream("retry: 300\ndata: tick\n\n"))
        .mount(&server)
        .await;

    let config =
        EventSourceConfig::new(server.uri()).reconnect_delay(Duration::from_millis(10));
    let (source, mut rx) = start(config);

    next(&mut rx).await.unwrap();
    let started = Instant::now();
    next(&mut rx).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));
    source.close().await;
}

#[tokio::test]
async fn test_oversized_field_skips_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(event_stream("id: 9\ndata: 123456\n\ndata: ok\n\n"))
        .mount(&server)
        .await;

    let config = EventSourceConfig::new(server.uri()).limits(BufferLimits {
        max_data: 4,
        ..Default::default()
    });
    let (source, mut rx) = start(config);

    let err = next(&mut rx).await.unwrap_err();
    assert!(err.is_field_too_long());
    assert_eq!(err.to_string(), "data field is too long (limit 4 bytes)");

    let ok = next(&mut rx).await.unwrap();
    assert_eq!(data(&ok), Some("ok"));
    assert_eq!(ok.id, None);
    source.close().await;
}

#[tokio::test]
async fn test_line_limit_reports_buffer_full() {
    let server = MockServer::start().await;
    let long = format!("data: {}\n\n", "x".repeat(100));
    Mock::given(method("GET"))
        .respond_with(event_stream(&long))
        .mount(&server)
        .await;

    let config = EventSourceConfig::new(server.uri()).limits(BufferLimits {
        max_line: 32,
        ..Default::default()
    });
    let (source, mut rx) = start(config);

    let err = next(&mut rx).await.unwrap_err();
    assert!(matches!(err, EventSourceError::Read(ReadError::BufferFull)));
    source.close().await;
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = EventSourceConfig::new(format!("http://{addr}/events"))
        .reconnect_delay(Duration::from_millis(10));
    let (source, mut rx) = start(config);

    let err = next(&mut rx).await.unwrap_err();
    assert!(matches!(err, EventSourceError::Request(_)));
    assert!(err.is_recoverable());
    source.close().await;
}

#[tokio::test]
async fn test_close_stops_reconnecting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(event_stream("data: x\n\n"))
        .mount(&server)
        .await;

    let config =
        EventSourceConfig::new(server.uri()).reconnect_delay(Duration::from_millis(10));
    let (source, mut rx) = start(config);

    next(&mut rx).await.unwrap();
    source.close().await;

    let count = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), count);

    while let Ok(received) = rx.try_recv() {
        received.unwrap();
    }
    assert!(rx.recv().await.is_none());
}
