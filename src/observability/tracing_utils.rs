//! Span helpers shared by the HTTP and realtime surfaces.

use tracing::{span, Level, Span};

/// Which remote surface a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Web API method call
    WebApi,
    /// Incoming webhook
    Webhook,
    /// Legacy slackbot webhook
    Slackbot,
    /// RTM WebSocket
    Rtm,
}

impl Surface {
    /// Stable name used in span fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::WebApi => "web_api",
            Surface::Webhook => "webhook",
            Surface::Slackbot => "slackbot",
            Surface::Rtm => "rtm",
        }
    }
}

/// Create a request span with common attributes
pub fn create_request_span(surface: Surface, target: &str) -> Span {
    span!(
        Level::INFO,
        "slack_request",
        surface = surface.as_str(),
        target = %target,
        otel.kind = "client",
        otel.status_code = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        error.message = tracing::field::Empty,
    )
}

/// Record the HTTP status on a span
pub fn record_status(span: &Span, status: u16) {
    span.record("http.status_code", status);
}

/// Record success on a span
pub fn record_success(span: &Span) {
    span.record("otel.status_code", "OK");
}

/// Record error on a span
pub fn record_error(span: &Span, error: &str) {
    span.record("otel.status_code", "ERROR");
    span.record("error.message", error);
}
