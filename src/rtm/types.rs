//! RTM message and event types.

use crate::services::ApiParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event surfaced by an [`RtmSocket`](super::RtmSocket)
#[derive(Debug, Clone, PartialEq)]
pub enum RtmEvent {
    /// The socket is open; always the first event
    Open,
    /// A JSON text frame from the server
    Message(Value),
    /// Transport or decode failure
    Error(String),
    /// The peer closed the connection
    Close(Option<String>),
}

impl RtmEvent {
    /// Event name as used by event-emitter style consumers
    pub fn name(&self) -> &'static str {
        match self {
            RtmEvent::Open => "open",
            RtmEvent::Message(_) => "message",
            RtmEvent::Error(_) => "error",
            RtmEvent::Close(_) => "close",
        }
    }

    /// The `type` field of a message event
    pub fn message_type(&self) -> Option<&str> {
        match self {
            RtmEvent::Message(value) => value.get("type").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// Outgoing RTM message; the socket assigns the `id` when sending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtmMessage {
    /// Message type (`message`, `typing`, `ping`, ...)
    #[serde(rename = "type")]
    pub message_type: String,
    /// Target channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Message text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Any other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RtmMessage {
    /// Message of an arbitrary type
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            channel: None,
            text: None,
            extra: Map::new(),
        }
    }

    /// Chat message to a channel
    pub fn message(channel: impl Into<String>, text: impl Into<String>) -> Self {
        let mut msg = Self::new("message");
        msg.channel = Some(channel.into());
        msg.text = Some(text.into());
        msg
    }

    /// Typing indicator for a channel
    pub fn typing(channel: impl Into<String>) -> Self {
        let mut msg = Self::new("typing");
        msg.channel = Some(channel.into());
        msg
    }

    /// Keepalive ping
    pub fn ping() -> Self {
        Self::new("ping")
    }

    /// Set an extra field
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}

/// Options for [`RtmClient::connect_with`](super::RtmClient::connect_with)
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Validate and build the handshake without performing any I/O
    pub dry_run: bool,
    /// Extra `rtm.start` parameters
    pub start_params: ApiParams,
}

impl ConnectOptions {
    /// Options that skip all I/O
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }

    /// Add an `rtm.start` parameter
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.start_params.insert(name.into(), value.into());
        self
    }
}

/// Typed view of the `rtm.start` response
#[derive(Debug, Clone, Deserialize)]
pub struct RtmStartResponse {
    /// Success indicator
    pub ok: bool,
    /// WebSocket URL
    pub url: String,
    /// Connected user
    #[serde(default, rename = "self")]
    pub self_user: Option<RtmSelf>,
    /// Workspace
    #[serde(default)]
    pub team: Option<RtmTeam>,
}

/// Connected user in `rtm.start`
#[derive(Debug, Clone, Deserialize)]
pub struct RtmSelf {
    /// User ID
    pub id: String,
    /// User name
    pub name: String,
}

/// Workspace in `rtm.start`
#[derive(Debug, Clone, Deserialize)]
pub struct RtmTeam {
    /// Team ID
    pub id: String,
    /// Team name
    pub name: String,
    /// Team subdomain
    #[serde(default)]
    pub domain: Option<String>,
}
