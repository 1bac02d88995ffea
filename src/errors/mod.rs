//! Error types for the Slack client.
//!
//! Every failure surfaces as a [`SlackError`] carrying a single descriptive
//! message. Configuration problems are reported before any I/O happens;
//! remote failures embed the provider's text verbatim.

use thiserror::Error;

/// Result type for Slack operations
pub type SlackResult<T> = Result<T, SlackError>;

/// Fallback description when the provider does not supply one
pub const NO_DESCRIPTION: &str = "No description.";

/// Root error type for the Slack client
#[derive(Error, Debug)]
pub enum SlackError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Request validation error
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Response parsing error
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// Realtime socket error
    #[error("Socket error: {0}")]
    Socket(#[from] SocketError),

    /// Web API call answered with `ok: false`
    #[error("Slack API method {method} failed: {code} ({description})")]
    Api {
        /// Web API method name
        method: String,
        /// Slack error code
        code: String,
        /// Human-readable description
        description: String,
    },

    /// Web API call answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Webhook or slackbot POST rejected by the remote side
    #[error("Webhook request failed with status {status}: {body}")]
    Webhook {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },
}

impl SlackError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "SLACK_CONFIG",
            Self::Request(_) => "SLACK_REQUEST",
            Self::Network(_) => "SLACK_NETWORK",
            Self::Response(_) => "SLACK_RESPONSE",
            Self::Socket(_) => "SLACK_SOCKET",
            Self::Api { .. } => "SLACK_API",
            Self::Http { .. } => "SLACK_HTTP",
            Self::Webhook { .. } => "SLACK_WEBHOOK",
        }
    }

    /// Build an API error from an `ok: false` response body
    pub fn from_api_body(method: &str, body: &serde_json::Value) -> Self {
        let code = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown_error");
        let description = ["detail", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_DESCRIPTION);

        Self::Api {
            method: method.to_string(),
            code: code.to_string(),
            description: description.to_string(),
        }
    }

    /// Slack error code for API errors
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// HTTP status code if the remote side answered
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Webhook { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Nothing usable was supplied
    #[error("Missing options: one of token, webhook or slackbot is required")]
    MissingOptions,

    /// Raw options were neither a string nor an object
    #[error("Invalid options type: expected a string or an object, received {received}")]
    InvalidOptionType {
        /// JSON type that was received
        received: String,
    },

    /// A string option matched none of the known shapes
    #[error("Unrecognized option: {value}")]
    UnrecognizedOption {
        /// The offending value
        value: String,
    },

    /// A keyed option failed its pattern
    #[error("Invalid option {key}: {value}")]
    InvalidOption {
        /// Option key
        key: String,
        /// The offending value
        value: String,
    },

    /// Web API call attempted without a token
    #[error("Token is missing")]
    MissingToken,

    /// Webhook submission attempted without a webhook URL
    #[error("Webhook URL is missing")]
    MissingWebhook,

    /// Slackbot submission attempted without a slackbot URL
    #[error("Slackbot URL is missing")]
    MissingSlackbot,

    /// Invalid transport configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },
}

/// Request validation errors
#[derive(Error, Debug)]
pub enum RequestError {
    /// Required payload field absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Payload could not be serialized
    #[error("Invalid payload: {message}")]
    InvalidPayload {
        /// Error message
        message: String,
    },

    /// Method name is not usable in a URL path
    #[error("Invalid method name: {0}")]
    InvalidMethod(String),
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Connection failed
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message
        message: String,
    },

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::ConnectionFailed {
                message: err.to_string(),
            }
        } else {
            NetworkError::Http(err.to_string())
        }
    }
}

/// Response parsing errors
#[derive(Error, Debug)]
pub enum ResponseError {
    /// JSON deserialization error
    #[error("Deserialization error: {message}")]
    Deserialization {
        /// Error message
        message: String,
    },

    /// Body was not valid UTF-8
    #[error("Response body is not valid UTF-8")]
    InvalidEncoding,
}

impl From<serde_json::Error> for ResponseError {
    fn from(err: serde_json::Error) -> Self {
        ResponseError::Deserialization {
            message: err.to_string(),
        }
    }
}

/// Realtime socket errors
#[derive(Error, Debug)]
pub enum SocketError {
    /// `rtm.start` body carried no socket URL
    #[error("No socket URL in rtm.start response")]
    MissingUrl,

    /// Socket URL could not be used
    #[error("Invalid socket URL {url}: {message}")]
    InvalidUrl {
        /// The URL that was rejected
        url: String,
        /// Error message
        message: String,
    },

    /// Connection could not be established
    #[error("Failed to connect: {message}")]
    ConnectionFailed {
        /// Error message
        message: String,
    },

    /// Outgoing frame exceeds the RTM size ceiling
    #[error("Message is too large: {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// Serialized frame size
        size: usize,
        /// Maximum allowed size
        limit: usize,
    },

    /// Socket is no longer writable
    #[error("Socket is closed")]
    Closed,

    /// Frame could not be encoded
    #[error("Failed to encode message: {message}")]
    Encode {
        /// Error message
        message: String,
    },

    /// WebSocket transport error
    #[error("WebSocket error: {message}")]
    WebSocket {
        /// Error message
        message: String,
    },
}
