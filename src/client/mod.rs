//! Slack client implementation.
//!
//! Provides the main entry point for the Web API, webhook, slackbot and RTM
//! surfaces.

use crate::auth::AuthManager;
use crate::config::{ClientOptions, SlackConfig};
use crate::errors::SlackResult;
use crate::rtm::{
    ConnectOptions, RtmClient, RtmClientTrait, RtmConnection, SocketConnector,
};
use crate::services::{
    ApiParams, ApiService, ApiServiceTrait, SlackbotService, SlackbotServiceTrait,
    WebhookService, WebhookServiceTrait,
};
use crate::transport::{HttpTransport, ReqwestTransport};
use serde_json::Value;
use std::sync::Arc;

/// Trait defining the Slack client interface
pub trait SlackClient: Send + Sync {
    /// Get the configuration
    fn config(&self) -> &SlackConfig;

    /// Get the credential manager
    fn auth_manager(&self) -> &AuthManager;

    /// Get the Web API service
    fn api(&self) -> &dyn ApiServiceTrait;

    /// Get the incoming webhook service
    fn webhook(&self) -> &dyn WebhookServiceTrait;

    /// Get the slackbot service
    fn slackbot(&self) -> &dyn SlackbotServiceTrait;

    /// Get the RTM client
    fn rtm(&self) -> &dyn RtmClientTrait;
}

/// Main Slack client implementation
#[derive(Clone)]
pub struct SlackClientImpl {
    config: Arc<SlackConfig>,
    auth: AuthManager,
    transport: Arc<dyn HttpTransport>,
    api_service: ApiService,
    webhook_service: WebhookService,
    slackbot_service: SlackbotService,
    rtm_client: RtmClient,
}

impl SlackClientImpl {
    /// Create a new Slack client with the given configuration
    pub fn new(config: SlackConfig) -> SlackResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Self::with_transport(config, transport)
    }

    /// Create a client from raw options: a token, webhook URL or slackbot
    /// URL string, or an object carrying any of `token`, `webhook` and
    /// `slackbot`.
    pub fn from_options(raw: Option<&Value>) -> SlackResult<Self> {
        let options = ClientOptions::parse(raw)?;
        Self::new(SlackConfig::from_options(options)?)
    }

    /// Create a client from a single option string
    pub fn from_option_str(raw: &str) -> SlackResult<Self> {
        Self::new(SlackConfig::from_option_str(raw)?)
    }

    /// Create a new Slack client with a custom transport
    pub fn with_transport(
        config: SlackConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> SlackResult<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let auth = AuthManager::new(config.clone());
        let base_url = config.build_url("");

        let api_service = ApiService::new(transport.clone(), auth.clone(), base_url);
        let webhook_service = WebhookService::new(transport.clone(), auth.clone());
        let slackbot_service = SlackbotService::new(transport.clone(), auth.clone());
        let rtm_client = RtmClient::new(api_service.clone(), default_connector());

        Ok(Self {
            config,
            auth,
            transport,
            api_service,
            webhook_service,
            slackbot_service,
            rtm_client,
        })
    }

    /// Replace the socket connector used by [`connect`](Self::connect)
    pub fn with_connector(mut self, connector: Arc<dyn SocketConnector>) -> Self {
        self.rtm_client = RtmClient::new(self.api_service.clone(), connector);
        self
    }

    /// Get a reference to the HTTP transport
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Get a reference to the Web API base URL
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    /// Build a full URL for a Web API method
    pub fn build_url(&self, endpoint: &str) -> String {
        self.config.build_url(endpoint)
    }

    /// Get the Web API service
    pub fn api(&self) -> &ApiService {
        &self.api_service
    }

    /// Get the incoming webhook service
    pub fn webhook(&self) -> &WebhookService {
        &self.webhook_service
    }

    /// Get the slackbot service
    pub fn slackbot(&self) -> &SlackbotService {
        &self.slackbot_service
    }

    /// Get the RTM client
    pub fn rtm(&self) -> &RtmClient {
        &self.rtm_client
    }

    /// Call a Web API method
    pub async fn call(&self, method: &str, params: ApiParams) -> SlackResult<Value> {
        self.api_service.call(method, params).await
    }

    /// POST a JSON payload to the incoming webhook
    pub async fn send_webhook(&self, payload: Value) -> SlackResult<String> {
        self.webhook_service.send(payload).await
    }

    /// POST a payload's `text` to the slackbot URL
    pub async fn send_slackbot(&self, payload: Value) -> SlackResult<String> {
        self.slackbot_service.send(payload).await
    }

    /// Start an RTM session
    pub async fn connect(&self) -> SlackResult<RtmConnection> {
        self.rtm_client.connect().await
    }

    /// Start an RTM session with options
    pub async fn connect_with(&self, options: ConnectOptions) -> SlackResult<Option<RtmConnection>> {
        self.rtm_client.connect_with(options).await
    }
}

#[cfg(feature = "rtm")]
fn default_connector() -> Arc<dyn SocketConnector> {
    Arc::new(crate::rtm::TungsteniteConnector::new())
}

#[cfg(not(feature = "rtm"))]
fn default_connector() -> Arc<dyn SocketConnector> {
    Arc::new(crate::rtm::UnavailableConnector)
}

impl SlackClient for SlackClientImpl {
    fn config(&self) -> &SlackConfig {
        &self.config
    }

    fn auth_manager(&self) -> &AuthManager {
        &self.auth
    }

    fn api(&self) -> &dyn ApiServiceTrait {
        &self.api_service
    }

    fn webhook(&self) -> &dyn WebhookServiceTrait {
        &self.webhook_service
    }

    fn slackbot(&self) -> &dyn SlackbotServiceTrait {
        &self.slackbot_service
    }

    fn rtm(&self) -> &dyn RtmClientTrait {
        &self.rtm_client
    }
}

impl std::fmt::Debug for SlackClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClientImpl")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .finish()
    }
}
