//! Realtime socket wrapper.
//!
//! The wrapper talks to its transport through a pair of channels so that
//! `send` stays synchronous and any [`SocketConnector`] can stand in for the
//! real WebSocket.

use super::types::{RtmEvent, RtmMessage};
use crate::errors::{SlackResult, SocketError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

/// Largest frame the RTM endpoint accepts
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024;

/// Frame queued for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketFrame {
    /// Text frame
    Text(String),
    /// Close the connection
    Close,
}

/// Raw event reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Text frame received
    Text(String),
    /// Transport failure
    Error(String),
    /// Connection closed, with the peer's reason if any
    Closed(Option<String>),
}

/// Channel ends handed to the wrapper by a connector
#[derive(Debug)]
pub struct SocketChannels {
    /// Frames to write
    pub outbound: mpsc::UnboundedSender<SocketFrame>,
    /// Events read from the connection
    pub inbound: mpsc::UnboundedReceiver<SocketEvent>,
}

/// Opens realtime connections
#[async_trait]
pub trait SocketConnector: Send + Sync {
    /// Open a connection; returns once the socket is open
    async fn open(&self, url: &str) -> SlackResult<SocketChannels>;
}

/// Check that a URL can be used for a WebSocket connection
pub fn validate_socket_url(url: &str) -> SlackResult<Url> {
    let parsed = Url::parse(url).map_err(|e| SocketError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    match parsed.scheme() {
        "ws" | "wss" => Ok(parsed),
        scheme => Err(SocketError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme {}", scheme),
        }
        .into()),
    }
}

/// One open RTM connection
pub struct RtmSocket {
    outbound: mpsc::UnboundedSender<SocketFrame>,
    inbound: mpsc::UnboundedReceiver<SocketEvent>,
    next_id: Mutex<u64>,
    open_reported: bool,
}

impl RtmSocket {
    /// Wrap the channels of an open connection
    pub fn new(channels: SocketChannels) -> Self {
        Self {
            outbound: channels.outbound,
            inbound: channels.inbound,
            next_id: Mutex::new(1),
            open_reported: false,
        }
    }

    /// Send a message and return its identifier
    pub fn send(&self, message: &RtmMessage) -> SlackResult<u64> {
        self.send_with(message, |_| {})
    }

    /// Send a message, invoking `on_sent` once the frame is handed to the
    /// transport.
    ///
    /// Frames over [`MAX_MESSAGE_BYTES`] fail immediately and the callback is
    /// not invoked.
    pub fn send_with<F>(&self, message: &RtmMessage, on_sent: F) -> SlackResult<u64>
    where
        F: FnOnce(&SlackResult<u64>),
    {
        let mut next_id = self.next_id.lock();
        let id = *next_id;

        let frame = encode_frame(message, id)?;
        if frame.len() > MAX_MESSAGE_BYTES {
            warn!(size = frame.len(), "Rejecting oversized RTM message");
            return Err(SocketError::MessageTooLarge {
                size: frame.len(),
                limit: MAX_MESSAGE_BYTES,
            }
            .into());
        }

        *next_id += 1;
        drop(next_id);

        let result: SlackResult<u64> = self
            .outbound
            .send(SocketFrame::Text(frame))
            .map(|_| id)
            .map_err(|_| SocketError::Closed.into());

        debug!(id, ok = result.is_ok(), "Queued RTM message");
        on_sent(&result);
        result
    }

    /// Next event from the connection; `None` once the transport is gone
    pub async fn next_event(&mut self) -> Option<RtmEvent> {
        if !self.open_reported {
            self.open_reported = true;
            return Some(RtmEvent::Open);
        }

        let event = self.inbound.recv().await?;
        Some(match event {
            SocketEvent::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => RtmEvent::Message(value),
                Err(e) => RtmEvent::Error(format!("Invalid JSON frame: {}", e)),
            },
            SocketEvent::Error(message) => RtmEvent::Error(message),
            SocketEvent::Closed(reason) => RtmEvent::Close(reason),
        })
    }

    /// Ask the transport to close the connection
    pub fn close(&self) -> SlackResult<()> {
        self.outbound
            .send(SocketFrame::Close)
            .map_err(|_| SocketError::Closed.into())
    }

    /// Whether the transport still accepts frames
    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }
}

impl std::fmt::Debug for RtmSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtmSocket")
            .field("next_id", &*self.next_id.lock())
            .field("is_open", &self.is_open())
            .finish()
    }
}

fn encode_frame(message: &RtmMessage, id: u64) -> SlackResult<String> {
    let mut value = serde_json::to_value(message).map_err(|e| SocketError::Encode {
        message: e.to_string(),
    })?;
    if let Value::Object(map) = &mut value {
        map.insert("id".to_string(), Value::from(id));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SlackError;
    use serde_json::json;

    fn socket() -> (
        RtmSocket,
        mpsc::UnboundedReceiver<SocketFrame>,
        mpsc::UnboundedSender<SocketEvent>,
    ) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let socket = RtmSocket::new(SocketChannels {
            outbound: out_tx,
            inbound: in_rx,
        });
        (socket, out_rx, in_tx)
    }

    #[test]
    fn test_validate_socket_url() {
        assert!(validate_socket_url("wss://cerberus.slack.com/websocket/abc").is_ok());
        assert!(validate_socket_url("ws://127.0.0.1:9000").is_ok());
        assert!(matches!(
            validate_socket_url("not a url"),
            Err(SlackError::Socket(SocketError::InvalidUrl { .. }))
        ));
        assert!(validate_socket_url("https://slack.com").is_err());
    }

    #[test]
    fn test_send_assigns_ids_and_forwards() {
        let (socket, mut frames, _events) = socket();

        assert_eq!(socket.send(&RtmMessage::message("C1", "hello")).unwrap(), 1);
        assert_eq!(socket.send(&RtmMessage::ping()).unwrap(), 2);

        let first = match frames.try_recv().unwrap() {
            SocketFrame::Text(text) => serde_json::from_str::<Value>(&text).unwrap(),
            SocketFrame::Close => panic!("unexpected close"),
        };
        assert_eq!(first, json!({"type": "message", "channel": "C1", "text": "hello", "id": 1}));
    }

    #[test]
    fn test_send_invokes_callback() {
        let (socket, _frames, _events) = socket();
        let mut seen = None;

        let id = socket
            .send_with(&RtmMessage::typing("C1"), |result| {
                seen = result.as_ref().ok().copied();
            })
            .unwrap();

        assert_eq!(seen, Some(id));
    }

    #[test]
    fn test_send_rejects_oversized_text() {
        let (socket, mut frames, _events) = socket();
        let mut called = false;

        let text = "x".repeat(MAX_MESSAGE_BYTES + 1);
        let err = socket
            .send_with(&RtmMessage::message("C1", text), |_| called = true)
            .unwrap_err();

        assert!(matches!(
            err,
            SlackError::Socket(SocketError::MessageTooLarge { limit: MAX_MESSAGE_BYTES, .. })
        ));
        assert!(!called);
        assert!(frames.try_recv().is_err());

        // the rejected message did not consume an id
        assert_eq!(socket.send(&RtmMessage::ping()).unwrap(), 1);
    }

    fn text_filling_frame(extra: usize) -> String {
        let overhead = encode_frame(&RtmMessage::message("C1", ""), 1).unwrap().len();
        "x".repeat(MAX_MESSAGE_BYTES - overhead + extra)
    }

    #[test]
    fn test_send_accepts_frame_at_limit() {
        let (socket, mut frames, _events) = socket();
        let message = RtmMessage::message("C1", text_filling_frame(0));

        assert_eq!(socket.send(&message).unwrap(), 1);
        match frames.try_recv().unwrap() {
            SocketFrame::Text(text) => assert_eq!(text.len(), MAX_MESSAGE_BYTES),
            SocketFrame::Close => panic!("unexpected close"),
        }
    }

    #[test]
    fn test_send_rejects_frame_one_byte_over_limit() {
        let (socket, mut frames, _events) = socket();
        let message = RtmMessage::message("C1", text_filling_frame(1));

        let err = socket.send(&message).unwrap_err();
        assert!(matches!(
            err,
            SlackError::Socket(SocketError::MessageTooLarge { size, .. }) if size == MAX_MESSAGE_BYTES + 1
        ));
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn test_send_after_transport_gone() {
        let (socket, frames, _events) = socket();
        drop(frames);

        assert!(!socket.is_open());
        assert!(matches!(
            socket.send(&RtmMessage::ping()),
            Err(SlackError::Socket(SocketError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_events_are_translated() {
        let (mut socket, _frames, events) = socket();
        events.send(SocketEvent::Text(r#"{"type":"hello"}"#.to_string())).unwrap();
        events.send(SocketEvent::Text("not json".to_string())).unwrap();
        events.send(SocketEvent::Error("reset by peer".to_string())).unwrap();
        events.send(SocketEvent::Closed(Some("bye".to_string()))).unwrap();
        drop(events);

        assert_eq!(socket.next_event().await, Some(RtmEvent::Open));
        assert_eq!(socket.next_event().await, Some(RtmEvent::Message(json!({"type": "hello"}))));
        assert!(matches!(socket.next_event().await, Some(RtmEvent::Error(_))));
        assert_eq!(
            socket.next_event().await,
            Some(RtmEvent::Error("reset by peer".to_string()))
        );
        assert_eq!(socket.next_event().await, Some(RtmEvent::Close(Some("bye".to_string()))));
        assert_eq!(socket.next_event().await, None);
    }

    #[test]
    fn test_close_sends_close_frame() {
        let (socket, mut frames, _events) = socket();
        socket.close().unwrap();
        assert_eq!(frames.try_recv().unwrap(), SocketFrame::Close);
    }
}
