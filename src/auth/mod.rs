//! Credential access for outbound requests.
//!
//! The Web API expects the token as a `token` query parameter; webhook and
//! slackbot URLs carry their own secrets and only need resolving.

use crate::config::{SlackConfig, SlackToken, SlackbotUrl, WebhookUrl};
use crate::errors::{ConfigurationError, SlackResult};
use crate::transport::HttpRequest;
use std::sync::Arc;
use std::time::Duration;

/// Query parameter the Web API reads the token from
pub const TOKEN_PARAM: &str = "token";

/// Credential manager for Slack requests
#[derive(Clone)]
pub struct AuthManager {
    config: Arc<SlackConfig>,
}

impl AuthManager {
    /// Create a new credential manager
    pub fn new(config: Arc<SlackConfig>) -> Self {
        Self { config }
    }

    /// Inject the token into a Web API request
    pub fn authorize(&self, request: HttpRequest) -> SlackResult<HttpRequest> {
        let token = self
            .config
            .token()
            .ok_or(ConfigurationError::MissingToken)?;
        Ok(request
            .with_headers(self.config.default_headers.clone())
            .with_timeout(self.config.timeout)
            .query(TOKEN_PARAM, token.expose()))
    }

    /// Per-request timeout taken from the configuration
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Resolve the incoming webhook URL
    pub fn webhook(&self) -> SlackResult<&WebhookUrl> {
        Ok(self
            .config
            .webhook()
            .ok_or(ConfigurationError::MissingWebhook)?)
    }

    /// Resolve the slackbot URL
    pub fn slackbot(&self) -> SlackResult<&SlackbotUrl> {
        Ok(self
            .config
            .slackbot()
            .ok_or(ConfigurationError::MissingSlackbot)?)
    }

    /// Check if a specific credential is available
    pub fn has(&self, kind: CredentialKind) -> bool {
        match kind {
            CredentialKind::Token => self.config.token().is_some(),
            CredentialKind::Webhook => self.config.webhook().is_some(),
            CredentialKind::Slackbot => self.config.slackbot().is_some(),
        }
    }

    /// Ensure a token is present without building a request
    pub fn require_token(&self) -> SlackResult<()> {
        if self.has(CredentialKind::Token) {
            Ok(())
        } else {
            Err(ConfigurationError::MissingToken.into())
        }
    }
}

/// Credential selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Web API token
    Token,
    /// Incoming webhook URL
    Webhook,
    /// Slackbot URL
    Slackbot,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_type", &self.config.token().map(SlackToken::prefix))
            .field("has_webhook", &self.has(CredentialKind::Webhook))
            .field("has_slackbot", &self.has(CredentialKind::Slackbot))
            .finish()
    }
}
