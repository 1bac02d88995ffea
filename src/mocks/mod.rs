//! Mock implementations for testing.
//!
//! Provides a recording HTTP transport and a channel-backed socket connector
//! so that every surface can be exercised without the network.

use crate::errors::{SlackError, SlackResult, SocketError};
use crate::rtm::{validate_socket_url, SocketChannels, SocketConnector, SocketEvent, SocketFrame};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, RequestBody};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Mock response configuration
#[derive(Debug)]
pub struct MockResponse {
    /// Response body
    pub body: String,
    /// HTTP status code
    pub status: u16,
    /// Delay before response
    pub delay_ms: Option<u64>,
    /// Error to return instead
    pub error: Option<SlackError>,
}

impl MockResponse {
    /// Create a successful JSON response
    pub fn json<T: Serialize>(data: &T) -> Self {
        Self::ok(serde_json::to_string(data).unwrap_or_default())
    }

    /// Create a successful response with raw body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status: 200,
            delay_ms: None,
            error: None,
        }
    }

    /// Create an error response
    pub fn error(error: SlackError) -> Self {
        Self {
            body: String::new(),
            status: 500,
            delay_ms: None,
            error: Some(error),
        }
    }

    /// Create a Slack API error response
    pub fn slack_error(error_code: &str) -> Self {
        Self::ok(format!(r#"{{"ok":false,"error":"{}"}}"#, error_code))
    }

    /// Override the status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add delay to response
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }
}

/// Recorded request for verification
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL, query included
    pub url: String,
    /// Request method
    pub method: String,
    /// Request body
    pub body: RequestBody,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Per-request timeout
    pub timeout: Option<std::time::Duration>,
}

/// Mock HTTP transport for testing
pub struct MockHttpTransport {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response to the queue
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Add a JSON response
    pub fn add_json_response<T: Serialize>(self, data: &T) -> Self {
        self.add_response(MockResponse::json(data))
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Get the last recorded request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Get remaining response count
    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().len()
    }

    fn record_request(&self, request: &HttpRequest) {
        let headers = request
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        self.requests.lock().push(RecordedRequest {
            url: request.full_url(),
            method: request.method.to_string(),
            body: request.body.clone(),
            headers,
            timeout: request.timeout,
        });
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn execute(&self, request: HttpRequest) -> SlackResult<HttpResponse> {
        self.record_request(&request);

        let response = self.responses.lock().pop_front().ok_or_else(|| {
            SlackError::Network(crate::errors::NetworkError::Http(
                "No mock response configured".to_string(),
            ))
        })?;

        if let Some(delay) = response.delay_ms {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }

        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(HttpResponse::new(response.status, response.body))
    }
}

impl std::fmt::Debug for MockHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpTransport")
            .field("pending_responses", &self.responses.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}

/// Far end of a mock socket
#[derive(Debug)]
pub struct MockSocketPeer {
    /// Frames the client wrote
    pub frames: mpsc::UnboundedReceiver<SocketFrame>,
    /// Inject events for the client to read
    pub events: mpsc::UnboundedSender<SocketEvent>,
}

impl MockSocketPeer {
    /// Deliver a JSON text frame to the client
    pub fn push_json(&self, value: serde_json::Value) -> bool {
        self.events.send(SocketEvent::Text(value.to_string())).is_ok()
    }

    /// Next text frame the client wrote, if any is waiting
    pub fn try_next_text(&mut self) -> Option<String> {
        match self.frames.try_recv().ok()? {
            SocketFrame::Text(text) => Some(text),
            SocketFrame::Close => None,
        }
    }
}

/// Mock socket connector
#[derive(Default)]
pub struct MockSocketConnector {
    opened: Mutex<Vec<String>>,
    peers: Mutex<VecDeque<MockSocketPeer>>,
    failure: Option<String>,
}

impl MockSocketConnector {
    /// Connector whose connections always open
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector whose connections always fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// URLs passed to `open`, in order
    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    /// Take the far end of the oldest open connection
    pub fn take_peer(&self) -> Option<MockSocketPeer> {
        self.peers.lock().pop_front()
    }
}

#[async_trait]
impl SocketConnector for MockSocketConnector {
    async fn open(&self, url: &str) -> SlackResult<SocketChannels> {
        self.opened.lock().push(url.to_string());
        validate_socket_url(url)?;

        if let Some(message) = &self.failure {
            return Err(SocketError::ConnectionFailed {
                message: message.clone(),
            }
            .into());
        }

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        self.peers.lock().push_back(MockSocketPeer {
            frames: out_rx,
            events: in_tx,
        });

        Ok(SocketChannels {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

impl std::fmt::Debug for MockSocketConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSocketConnector")
            .field("opened", &self.opened.lock().len())
            .field("failure", &self.failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_replays_in_order() {
        let transport = MockHttpTransport::new()
            .add_json_response(&json!({"ok": true}))
            .add_response(MockResponse::ok("ok").with_status(201));

        let first = transport.execute(HttpRequest::get("https://slack.com/api/a")).await.unwrap();
        let second = transport.execute(HttpRequest::get("https://slack.com/api/b")).await.unwrap();

        assert_eq!(first.json().unwrap(), json!({"ok": true}));
        assert_eq!(second.status, 201);
        assert_eq!(transport.remaining_responses(), 0);
        assert_eq!(transport.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_error() {
        let transport = MockHttpTransport::new()
            .add_response(MockResponse::error(SlackError::Network(crate::errors::NetworkError::Timeout)));

        let result = transport.execute(HttpRequest::get("https://slack.com/api/test")).await;
        assert!(matches!(result, Err(SlackError::Network(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_transport_delay() {
        let transport = MockHttpTransport::new().add_response(MockResponse::ok("ok").with_delay(250));

        let started = tokio::time::Instant::now();
        let response = transport.execute(HttpRequest::get("https://slack.com/api/test")).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(started.elapsed() >= std::time::Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_mock_transport_exhausted() {
        let transport = MockHttpTransport::new();
        assert!(transport.execute(HttpRequest::get("https://slack.com/api/test")).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_connector_round_trip() {
        let connector = MockSocketConnector::new();
        let channels = connector.open("wss://example.slack.com/ws").await.unwrap();
        let mut peer = connector.take_peer().unwrap();

        channels.outbound.send(SocketFrame::Text("hi".to_string())).unwrap();
        assert_eq!(peer.try_next_text().as_deref(), Some("hi"));
        assert!(peer.push_json(json!({"type": "hello"})));
        assert_eq!(connector.opened_urls(), vec!["wss://example.slack.com/ws".to_string()]);
    }
}
