//! Client option discrimination.
//!
//! A client can be created from a single string whose shape decides what it
//! is (a Web API token, an incoming webhook URL or a slackbot URL), or from an
//! object naming any subset of the three. [`ClientOptions::parse`] is the one
//! place where raw input is turned into a validated, tagged value.

use crate::errors::ConfigurationError;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use url::Url;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^xox[abprs]-[A-Za-z0-9-]+$").expect("token pattern compiles"));

static WEBHOOK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://hooks\.slack\.com/services/[A-Za-z0-9]+/[A-Za-z0-9]+/[A-Za-z0-9]+/?$")
        .expect("webhook pattern compiles")
});

static SLACKBOT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://[A-Za-z0-9-]+\.slack\.com/services/hooks/slackbot\?token=[A-Za-z0-9]+$")
        .expect("slackbot pattern compiles")
});

/// Option key for the Web API token
pub const TOKEN_KEY: &str = "token";
/// Option key for the incoming webhook URL
pub const WEBHOOK_KEY: &str = "webhook";
/// Option key for the slackbot URL
pub const SLACKBOT_KEY: &str = "slackbot";

/// Web API token
#[derive(Clone)]
pub struct SlackToken {
    token: SecretString,
}

impl SlackToken {
    /// Validate and wrap a token
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigurationError> {
        let token = token.into();
        if !Self::matches(&token) {
            return Err(ConfigurationError::InvalidOption {
                key: TOKEN_KEY.to_string(),
                value: token,
            });
        }
        Ok(Self {
            token: SecretString::new(token),
        })
    }

    /// Whether a string has the token shape
    pub fn matches(candidate: &str) -> bool {
        TOKEN_PATTERN.is_match(candidate)
    }

    /// Token prefix (`xoxb`, `xoxp`, ...)
    pub fn prefix(&self) -> &str {
        self.expose().split('-').next().unwrap_or_default()
    }

    /// Expose the token for use in requests
    pub(crate) fn expose(&self) -> &str {
        self.token.expose_secret()
    }
}

impl PartialEq for SlackToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SlackToken {}

impl fmt::Debug for SlackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlackToken({})", crate::observability::redact_token(self.expose()))
    }
}

/// Incoming webhook URL
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookUrl {
    url: Url,
}

impl WebhookUrl {
    /// Validate and wrap a webhook URL
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigurationError> {
        let url = url.into();
        if !Self::matches(&url) {
            return Err(invalid(WEBHOOK_KEY, url));
        }
        match Url::parse(&url) {
            Ok(parsed) => Ok(Self { url: parsed }),
            Err(_) => Err(invalid(WEBHOOK_KEY, url)),
        }
    }

    /// Whether a string has the webhook shape
    pub fn matches(candidate: &str) -> bool {
        WEBHOOK_PATTERN.is_match(candidate)
    }

    /// The parsed URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebhookUrl({})", crate::observability::redact_url(self.url.as_str()))
    }
}

/// Legacy slackbot URL
#[derive(Clone, PartialEq, Eq)]
pub struct SlackbotUrl {
    url: Url,
}

impl SlackbotUrl {
    /// Validate and wrap a slackbot URL
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigurationError> {
        let url = url.into();
        if !Self::matches(&url) {
            return Err(invalid(SLACKBOT_KEY, url));
        }
        match Url::parse(&url) {
            Ok(parsed) => Ok(Self { url: parsed }),
            Err(_) => Err(invalid(SLACKBOT_KEY, url)),
        }
    }

    /// Whether a string has the slackbot shape
    pub fn matches(candidate: &str) -> bool {
        SLACKBOT_PATTERN.is_match(candidate)
    }

    /// The parsed URL, token query parameter included
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Team subdomain the URL points at
    pub fn team(&self) -> Option<&str> {
        self.url
            .host_str()
            .and_then(|host| host.strip_suffix(".slack.com"))
    }
}

impl fmt::Debug for SlackbotUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlackbotUrl({})", crate::observability::redact_url(self.url.as_str()))
    }
}

fn invalid(key: &str, value: String) -> ConfigurationError {
    ConfigurationError::InvalidOption {
        key: key.to_string(),
        value,
    }
}

/// Validated client options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOptions {
    /// A bare Web API token
    Token(SlackToken),
    /// A bare incoming webhook URL
    Webhook(WebhookUrl),
    /// A bare slackbot URL
    Slackbot(SlackbotUrl),
    /// An explicit options object carrying a non-empty subset of the three
    Composite {
        /// Web API token
        token: Option<SlackToken>,
        /// Incoming webhook URL
        webhook: Option<WebhookUrl>,
        /// Slackbot URL
        slackbot: Option<SlackbotUrl>,
    },
}

impl ClientOptions {
    /// Turn raw input into validated options.
    ///
    /// Strings are matched against the token, webhook and slackbot shapes in
    /// that order; objects have each of their `token`, `webhook` and
    /// `slackbot` keys validated individually.
    pub fn parse(raw: Option<&Value>) -> Result<Self, ConfigurationError> {
        match raw {
            None | Some(Value::Null) => Err(ConfigurationError::MissingOptions),
            Some(Value::String(s)) => Self::parse_str(s),
            Some(Value::Object(map)) => Self::parse_object(map),
            Some(other) => Err(ConfigurationError::InvalidOptionType {
                received: json_type_name(other).to_string(),
            }),
        }
    }

    /// Disambiguate a single option string
    pub fn parse_str(raw: &str) -> Result<Self, ConfigurationError> {
        if raw.is_empty() {
            return Err(ConfigurationError::MissingOptions);
        }

        if SlackToken::matches(raw) {
            SlackToken::new(raw).map(Self::Token)
        } else if WebhookUrl::matches(raw) {
            WebhookUrl::new(raw).map(Self::Webhook)
        } else if SlackbotUrl::matches(raw) {
            SlackbotUrl::new(raw).map(Self::Slackbot)
        } else {
            Err(ConfigurationError::UnrecognizedOption {
                value: raw.to_string(),
            })
        }
    }

    fn parse_object(map: &Map<String, Value>) -> Result<Self, ConfigurationError> {
        let token = keyed(map, TOKEN_KEY, SlackToken::new)?;
        let webhook = keyed(map, WEBHOOK_KEY, WebhookUrl::new)?;
        let slackbot = keyed(map, SLACKBOT_KEY, SlackbotUrl::new)?;

        if token.is_none() && webhook.is_none() && slackbot.is_none() {
            return Err(ConfigurationError::MissingOptions);
        }

        Ok(Self::Composite {
            token,
            webhook,
            slackbot,
        })
    }

    /// Options holding only a token
    pub fn from_token(token: &str) -> Result<Self, ConfigurationError> {
        SlackToken::new(token).map(Self::Token)
    }

    /// Options holding only a webhook URL
    pub fn from_webhook(url: &str) -> Result<Self, ConfigurationError> {
        WebhookUrl::new(url).map(Self::Webhook)
    }

    /// Options holding only a slackbot URL
    pub fn from_slackbot(url: &str) -> Result<Self, ConfigurationError> {
        SlackbotUrl::new(url).map(Self::Slackbot)
    }

    /// The token, if any
    pub fn token(&self) -> Option<&SlackToken> {
        match self {
            Self::Token(token) => Some(token),
            Self::Composite { token, .. } => token.as_ref(),
            _ => None,
        }
    }

    /// The webhook URL, if any
    pub fn webhook(&self) -> Option<&WebhookUrl> {
        match self {
            Self::Webhook(webhook) => Some(webhook),
            Self::Composite { webhook, .. } => webhook.as_ref(),
            _ => None,
        }
    }

    /// The slackbot URL, if any
    pub fn slackbot(&self) -> Option<&SlackbotUrl> {
        match self {
            Self::Slackbot(slackbot) => Some(slackbot),
            Self::Composite { slackbot, .. } => slackbot.as_ref(),
            _ => None,
        }
    }
}

fn keyed<T>(
    map: &Map<String, Value>,
    key: &str,
    validate: impl FnOnce(String) -> Result<T, ConfigurationError>,
) -> Result<Option<T>, ConfigurationError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => validate(s.clone()).map(Some),
        Some(other) => Err(invalid(key, other.to_string())),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FromStr for ClientOptions {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl TryFrom<&Value> for ClientOptions {
    type Error = ConfigurationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::parse(Some(value))
    }
}
