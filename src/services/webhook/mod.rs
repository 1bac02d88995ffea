//! Incoming webhook submitter.

use crate::auth::AuthManager;
use crate::errors::{RequestError, SlackResult};
use crate::observability::Surface;
use crate::transport::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Trait for incoming webhook operations
#[async_trait]
pub trait WebhookServiceTrait: Send + Sync {
    /// POST a JSON payload to the webhook; resolves with the response text
    async fn send(&self, payload: Value) -> SlackResult<String>;
}

/// Incoming webhook service implementation
#[derive(Clone)]
pub struct WebhookService {
    transport: Arc<dyn HttpTransport>,
    auth: AuthManager,
}

impl WebhookService {
    /// Create a new webhook service
    pub fn new(transport: Arc<dyn HttpTransport>, auth: AuthManager) -> Self {
        Self { transport, auth }
    }

    /// Serialize and send any payload
    pub async fn send_payload<T: Serialize + ?Sized>(&self, payload: &T) -> SlackResult<String> {
        let payload = serde_json::to_value(payload).map_err(|e| RequestError::InvalidPayload {
            message: e.to_string(),
        })?;
        self.send(payload).await
    }

    /// Send a plain text message
    pub async fn send_text(&self, text: impl Into<String> + Send) -> SlackResult<String> {
        self.send_payload(&WebhookPayload::new(text)).await
    }
}

#[async_trait]
impl WebhookServiceTrait for WebhookService {
    async fn send(&self, payload: Value) -> SlackResult<String> {
        let url = self.auth.webhook()?.url().as_str().to_string();
        super::submit(
            self.transport.as_ref(),
            Surface::Webhook,
            HttpRequest::post_json(url, payload).with_timeout(self.auth.timeout()),
        )
        .await
    }
}

impl std::fmt::Debug for WebhookService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookService")
            .field("auth", &self.auth)
            .finish()
    }
}

/// Payload for incoming webhook messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Message text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Channel override (legacy webhooks only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Display name override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Emoji avatar, e.g. `:ghost:`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    /// Image avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Block Kit blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Value>>,
    /// Legacy attachments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Value>>,
    /// Thread timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Enable mrkdwn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrkdwn: Option<bool>,
    /// Unfurl links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_links: Option<bool>,
    /// Unfurl media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_media: Option<bool>,
}

impl WebhookPayload {
    /// Create a new payload with text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create a payload with blocks
    pub fn with_blocks(blocks: Vec<Value>) -> Self {
        Self {
            blocks: Some(blocks),
            ..Default::default()
        }
    }

    /// Set text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set channel
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Set username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set emoji icon
    pub fn icon_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.icon_emoji = Some(emoji.into());
        self
    }

    /// Set icon URL
    pub fn icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }

    /// Add an attachment
    pub fn attachment(mut self, attachment: Value) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    /// Set thread
    pub fn thread_ts(mut self, ts: impl Into<String>) -> Self {
        self.thread_ts = Some(ts.into());
        self
    }

    /// Set mrkdwn
    pub fn mrkdwn(mut self, enabled: bool) -> Self {
        self.mrkdwn = Some(enabled);
        self
    }
}
