//! RTM handshake and connection.

use super::socket::{RtmSocket, SocketChannels, SocketConnector};
use super::types::{ConnectOptions, RtmStartResponse};
use crate::errors::{SlackError, SlackResult, SocketError};
use crate::observability::{create_request_span, record_error, record_success, redact_url, Surface};
use crate::services::{ApiParams, ApiService, ApiServiceTrait};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, Instrument};

/// Web API method that bootstraps the realtime session
pub const RTM_START_METHOD: &str = "rtm.start";

/// Trait for RTM operations
#[async_trait]
pub trait RtmClientTrait: Send + Sync {
    /// Perform the handshake and open the socket
    async fn connect(&self) -> SlackResult<RtmConnection>;

    /// Like [`connect`](Self::connect); `Ok(None)` when `dry_run` is set
    async fn connect_with(&self, options: ConnectOptions) -> SlackResult<Option<RtmConnection>>;
}

/// An open realtime session
#[derive(Debug)]
pub struct RtmConnection {
    /// Full `rtm.start` response body
    pub start: Value,
    /// The open socket
    pub socket: RtmSocket,
}

impl RtmConnection {
    /// Typed view of the `rtm.start` body
    pub fn start_info(&self) -> SlackResult<RtmStartResponse> {
        serde_json::from_value(self.start.clone()).map_err(|e| SlackError::Response(e.into()))
    }
}

/// RTM client implementation
#[derive(Clone)]
pub struct RtmClient {
    api: ApiService,
    connector: Arc<dyn SocketConnector>,
}

impl RtmClient {
    /// Create a new RTM client
    pub fn new(api: ApiService, connector: Arc<dyn SocketConnector>) -> Self {
        Self { api, connector }
    }

    async fn open(&self, params: ApiParams) -> SlackResult<RtmConnection> {
        let start = self.api.call(RTM_START_METHOD, params).await?;

        let url = start
            .get("url")
            .and_then(Value::as_str)
            .ok_or(SocketError::MissingUrl)?
            .to_string();

        let target = redact_url(&url);
        info!(url = %target, "Opening RTM socket");

        let span = create_request_span(Surface::Rtm, &target);
        let channels: SocketChannels = match self.connector.open(&url).instrument(span.clone()).await {
            Ok(channels) => {
                record_success(&span);
                channels
            }
            Err(e) => {
                record_error(&span, &e.to_string());
                return Err(e);
            }
        };

        Ok(RtmConnection {
            start,
            socket: RtmSocket::new(channels),
        })
    }
}

#[async_trait]
impl RtmClientTrait for RtmClient {
    #[instrument(skip(self))]
    async fn connect(&self) -> SlackResult<RtmConnection> {
        self.open(ApiParams::new()).await
    }

    #[instrument(skip(self, options), fields(dry_run = options.dry_run))]
    async fn connect_with(&self, options: ConnectOptions) -> SlackResult<Option<RtmConnection>> {
        if options.dry_run {
            self.api.build_request(RTM_START_METHOD, &options.start_params)?;
            return Ok(None);
        }
        self.open(options.start_params).await.map(Some)
    }
}

impl std::fmt::Debug for RtmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtmClient").field("api", &self.api).finish()
    }
}

/// Connector used when the crate is built without the `rtm` feature
#[cfg(not(feature = "rtm"))]
#[derive(Debug, Clone, Default)]
pub(crate) struct UnavailableConnector;

#[cfg(not(feature = "rtm"))]
#[async_trait]
impl SocketConnector for UnavailableConnector {
    async fn open(&self, _url: &str) -> SlackResult<SocketChannels> {
        Err(SocketError::ConnectionFailed {
            message: "built without the rtm feature".to_string(),
        }
        .into())
    }
}
