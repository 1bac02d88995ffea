//! Legacy slackbot submitter.
//!
//! The slackbot endpoint takes the message text as a raw body and the target
//! channel as a query parameter next to the URL's own token.

use crate::auth::AuthManager;
use crate::errors::{RequestError, SlackResult};
use crate::observability::Surface;
use crate::transport::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Channel used when a payload names none
pub const DEFAULT_CHANNEL: &str = "#general";

/// Trait for slackbot operations
#[async_trait]
pub trait SlackbotServiceTrait: Send + Sync {
    /// POST the payload's `text` to the slackbot URL; resolves with the response text
    async fn send(&self, payload: Value) -> SlackResult<String>;
}

/// Slackbot message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackbotMessage {
    /// Message text, sent as the raw body
    pub text: String,
    /// Target channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl SlackbotMessage {
    /// Message to the default channel
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            channel: None,
        }
    }

    /// Target a specific channel
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Channel the message goes to
    pub fn target_channel(&self) -> &str {
        self.channel.as_deref().unwrap_or(DEFAULT_CHANNEL)
    }

    /// Extract a message from a loose payload mapping
    pub fn from_payload(payload: &Value) -> SlackResult<Self> {
        let text = match payload.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => {
                return Err(RequestError::InvalidPayload {
                    message: format!("text must be a string, received {}", other),
                }
                .into())
            }
            None => return Err(RequestError::MissingField("text").into()),
        };

        let channel = match payload.get("channel") {
            None | Some(Value::Null) => None,
            Some(Value::String(channel)) if channel.is_empty() => None,
            Some(Value::String(channel)) => Some(channel.clone()),
            Some(other) => {
                return Err(RequestError::InvalidPayload {
                    message: format!("channel must be a string, received {}", other),
                }
                .into())
            }
        };

        Ok(Self { text, channel })
    }
}

/// Slackbot service implementation
#[derive(Clone)]
pub struct SlackbotService {
    transport: Arc<dyn HttpTransport>,
    auth: AuthManager,
}

impl SlackbotService {
    /// Create a new slackbot service
    pub fn new(transport: Arc<dyn HttpTransport>, auth: AuthManager) -> Self {
        Self { transport, auth }
    }

    /// Send a typed message
    pub async fn send_message(&self, message: &SlackbotMessage) -> SlackResult<String> {
        let url = self.auth.slackbot()?.url().as_str().to_string();
        let request = HttpRequest::post_text(url, message.text.clone())
            .query("channel", message.target_channel())
            .with_timeout(self.auth.timeout());

        super::submit(self.transport.as_ref(), Surface::Slackbot, request).await
    }
}

#[async_trait]
impl SlackbotServiceTrait for SlackbotService {
    async fn send(&self, payload: Value) -> SlackResult<String> {
        let message = SlackbotMessage::from_payload(&payload)?;
        self.send_message(&message).await
    }
}

impl std::fmt::Debug for SlackbotService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackbotService")
            .field("auth", &self.auth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlackConfigBuilder;
    use crate::errors::SlackError;
    use crate::mocks::{MockHttpTransport, MockResponse};
    use crate::transport::RequestBody;
    use serde_json::json;

    const SLACKBOT: &str = "https://myteam.slack.com/services/hooks/slackbot?token=abc123";

    fn service(transport: Arc<MockHttpTransport>) -> SlackbotService {
        let config = Arc::new(
            SlackConfigBuilder::new()
                .slackbot(SLACKBOT)
                .unwrap()
                .build_unchecked(),
        );
        SlackbotService::new(transport, AuthManager::new(config))
    }

    #[test]
    fn test_from_payload() {
        let message = SlackbotMessage::from_payload(&json!({"text": "hi"})).unwrap();
        assert_eq!(message.target_channel(), DEFAULT_CHANNEL);

        let message = SlackbotMessage::from_payload(&json!({"text": "hi", "channel": "#random"})).unwrap();
        assert_eq!(message.target_channel(), "#random");

        assert!(matches!(
            SlackbotMessage::from_payload(&json!({"channel": "#random"})),
            Err(SlackError::Request(RequestError::MissingField("text")))
        ));
        assert!(SlackbotMessage::from_payload(&json!({"text": 3})).is_err());

        let message = SlackbotMessage::from_payload(&json!({"text": "hi", "channel": null})).unwrap();
        assert_eq!(message.target_channel(), DEFAULT_CHANNEL);
    }

    #[tokio::test]
    async fn test_send_rejects_non_string_channel() {
        let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("ok")));
        let err = service(transport.clone())
            .send(json!({"text": "secret", "channel": ["#private"]}))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SlackError::Request(RequestError::InvalidPayload { .. })
        ));
        assert!(transport.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_defaults_to_general() {
        let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("ok")));
        let result = service(transport.clone())
            .send(json!({"text": "build green"}))
            .await
            .unwrap();

        assert_eq!(result, "ok");
        let recorded = transport.last_request().unwrap();
        assert_eq!(
            recorded.url,
            "https://myteam.slack.com/services/hooks/slackbot?token=abc123&channel=%23general"
        );
        assert_eq!(recorded.body, RequestBody::Text("build green".to_string()));
    }

    #[tokio::test]
    async fn test_send_overrides_channel() {
        let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("ok")));
        service(transport.clone())
            .send_message(&SlackbotMessage::new("deploy").channel("#ops"))
            .await
            .unwrap();

        let recorded = transport.last_request().unwrap();
        assert!(recorded.url.ends_with("channel=%23ops"));
    }

    #[tokio::test]
    async fn test_send_failure_embeds_body() {
        let transport = Arc::new(
            MockHttpTransport::new().add_response(MockResponse::ok("channel_not_found").with_status(404)),
        );
        let err = service(transport)
            .send(json!({"text": "hello", "channel": "#nowhere"}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("channel_not_found"));
        assert_eq!(err.http_status(), Some(404));
    }
}
