//! Realtime messaging tests.

use crate::config::SlackConfig;
use crate::errors::{SlackError, SocketError};
use crate::fixtures;
use crate::mocks::{MockHttpTransport, MockSocketConnector};
use crate::rtm::{ConnectOptions, RtmEvent, RtmMessage, MAX_MESSAGE_BYTES};
use crate::SlackClientImpl;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOCKET_URL: &str = "wss://cerberus-xxxx.lb.slack-msgs.com/websocket/abc";

fn token_config() -> SlackConfig {
    SlackConfig::from_option_str(fixtures::TOKEN).unwrap()
}

fn mocked_client(
    start: Value,
) -> (SlackClientImpl, Arc<MockHttpTransport>, Arc<MockSocketConnector>) {
    let transport = Arc::new(MockHttpTransport::new().add_json_response(&start));
    let connector = Arc::new(MockSocketConnector::new());
    let client = SlackClientImpl::with_transport(token_config(), transport.clone())
        .unwrap()
        .with_connector(connector.clone());
    (client, transport, connector)
}

#[tokio::test]
async fn test_connect_opens_url_from_rtm_start() {
    let (client, transport, connector) = mocked_client(fixtures::rtm_start(SOCKET_URL));

    let connection = client.connect().await.unwrap();

    assert_eq!(connector.opened_urls(), vec![SOCKET_URL.to_string()]);
    let request = transport.last_request().unwrap();
    assert!(request.url.starts_with("https://slack.com/api/rtm.start?token="));

    let info = connection.start_info().unwrap();
    assert_eq!(info.url, SOCKET_URL);
    assert_eq!(connection.start["team"]["domain"], "acme");
}

#[tokio::test]
async fn test_events_flow_from_socket() {
    let (client, _transport, connector) = mocked_client(fixtures::rtm_start(SOCKET_URL));
    let mut connection = client.connect().await.unwrap();
    let peer = connector.take_peer().unwrap();

    assert!(peer.push_json(fixtures::hello_event()));
    assert_eq!(connection.socket.next_event().await, Some(RtmEvent::Open));

    let event = connection.socket.next_event().await.unwrap();
    assert_eq!(event.message_type(), Some("hello"));
}

#[tokio::test]
async fn test_send_returns_incrementing_ids() {
    let (client, _transport, connector) = mocked_client(fixtures::rtm_start(SOCKET_URL));
    let connection = client.connect().await.unwrap();
    let mut peer = connector.take_peer().unwrap();

    let mut acknowledged = Vec::new();
    let first = connection
        .socket
        .send_with(&RtmMessage::message("C024BE91L", "hi"), |r| {
            acknowledged.push(r.is_ok())
        })
        .unwrap();
    let second = connection.socket.send(&RtmMessage::typing("C024BE91L")).unwrap();

    assert_eq!((first, second), (1, 2));
    assert_eq!(acknowledged, vec![true]);

    let frame: Value = serde_json::from_str(&peer.try_next_text().unwrap()).unwrap();
    assert_eq!(
        frame,
        json!({"id": 1, "type": "message", "channel": "C024BE91L", "text": "hi"})
    );
}

#[tokio::test]
async fn test_oversized_message_is_rejected() {
    let (client, _transport, connector) = mocked_client(fixtures::rtm_start(SOCKET_URL));
    let connection = client.connect().await.unwrap();
    let mut peer = connector.take_peer().unwrap();

    let text = "a".repeat(MAX_MESSAGE_BYTES);
    let err = connection
        .socket
        .send(&RtmMessage::message("C024BE91L", text))
        .unwrap_err();

    assert!(matches!(
        err,
        SlackError::Socket(SocketError::MessageTooLarge { .. })
    ));
    assert!(peer.try_next_text().is_none());
}

#[tokio::test]
async fn test_dry_run_performs_no_io() {
    let transport = Arc::new(MockHttpTransport::new());
    let connector = Arc::new(MockSocketConnector::new());
    let client = SlackClientImpl::with_transport(token_config(), transport.clone())
        .unwrap()
        .with_connector(connector.clone());

    let connection = client.connect_with(ConnectOptions::dry_run()).await.unwrap();

    assert!(connection.is_none());
    assert!(transport.recorded_requests().is_empty());
    assert!(connector.opened_urls().is_empty());
}

#[tokio::test]
async fn test_dry_run_still_requires_token() {
    let config = SlackConfig::from_option_str(fixtures::WEBHOOK_URL).unwrap();
    let client = SlackClientImpl::with_transport(config, Arc::new(MockHttpTransport::new())).unwrap();

    assert!(client.connect_with(ConnectOptions::dry_run()).await.is_err());
}

#[tokio::test]
async fn test_rtm_start_failure_is_propagated() {
    let (client, _transport, connector) = mocked_client(fixtures::api_error("not_authed"));

    let err = client.connect().await.unwrap_err();

    assert_eq!(err.api_code(), Some("not_authed"));
    assert!(connector.opened_urls().is_empty());
}

#[tokio::test]
async fn test_missing_socket_url_is_reported() {
    let (client, _transport, _connector) = mocked_client(json!({"ok": true}));

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, SlackError::Socket(SocketError::MissingUrl)));
}

#[tokio::test]
async fn test_connection_failure_is_propagated() {
    let transport = Arc::new(MockHttpTransport::new().add_json_response(&fixtures::rtm_start(SOCKET_URL)));
    let client = SlackClientImpl::with_transport(token_config(), transport)
        .unwrap()
        .with_connector(Arc::new(MockSocketConnector::failing("handshake refused")));

    let err = client.connect().await.unwrap_err();
    assert!(err.to_string().contains("handshake refused"));
}

#[tokio::test]
async fn test_connect_over_http_with_start_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rtm.start"))
        .and(query_param("token", fixtures::TOKEN))
        .and(query_param("simple_latest", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::rtm_start(SOCKET_URL)))
        .expect(1)
        .mount(&server)
        .await;

    let config = SlackConfig::builder()
        .token(fixtures::TOKEN)
        .unwrap()
        .base_url(&server.uri())
        .unwrap()
        .build()
        .unwrap();
    let connector = Arc::new(MockSocketConnector::new());
    let client = SlackClientImpl::new(config)
        .unwrap()
        .with_connector(connector.clone());

    let connection = client
        .connect_with(ConnectOptions::default().param("simple_latest", true))
        .await
        .unwrap();

    assert!(connection.is_some());
    assert_eq!(connector.opened_urls(), vec![SOCKET_URL.to_string()]);
}

#[tokio::test]
async fn test_malformed_socket_url_is_rejected() {
    let (client, _transport, _connector) = mocked_client(fixtures::rtm_start("http://not-a-socket"));

    let err = client.connect().await.unwrap_err();
    assert!(matches!(
        err,
        SlackError::Socket(SocketError::InvalidUrl { .. })
    ));
}
