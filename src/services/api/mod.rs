//! Web API method caller.
//!
//! Every method is reached with a GET to `<base_url>/<method>`; parameters
//! travel in the query string next to the token.

use crate::auth::{AuthManager, TOKEN_PARAM};
use crate::errors::{RequestError, SlackError, SlackResult};
use crate::observability::{create_request_span, record_error, record_status, record_success, Surface};
use crate::transport::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, Instrument};

/// Parameters for a Web API call
pub type ApiParams = Map<String, Value>;

/// Trait for Web API operations
#[async_trait]
pub trait ApiServiceTrait: Send + Sync {
    /// Call a Web API method and return the parsed body
    async fn call(&self, method: &str, params: ApiParams) -> SlackResult<Value>;
}

/// Web API service implementation
#[derive(Clone)]
pub struct ApiService {
    transport: Arc<dyn HttpTransport>,
    auth: AuthManager,
    base_url: String,
}

impl ApiService {
    /// Create a new Web API service
    pub fn new(transport: Arc<dyn HttpTransport>, auth: AuthManager, base_url: String) -> Self {
        Self {
            transport,
            auth,
            base_url,
        }
    }

    fn build_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), method)
    }

    /// Build the authorized GET request for a method
    pub fn build_request(&self, method: &str, params: &ApiParams) -> SlackResult<HttpRequest> {
        if !is_valid_method(method) {
            return Err(RequestError::InvalidMethod(method.to_string()).into());
        }

        let request = params
            .iter()
            // the configured token always wins
            .filter(|(name, _)| name.as_str() != TOKEN_PARAM)
            .filter_map(|(name, value)| encode_param(value).map(|v| (name, v)))
            .fold(HttpRequest::get(self.build_url(method)), |request, (name, value)| {
                request.query(name.as_str(), value)
            });

        self.auth.authorize(request)
    }

    /// Call a method and deserialize the successful body
    pub async fn call_as<T: DeserializeOwned>(&self, method: &str, params: ApiParams) -> SlackResult<T> {
        let body = self.call(method, params).await?;
        serde_json::from_value(body).map_err(|e| SlackError::Response(e.into()))
    }
}

#[async_trait]
impl ApiServiceTrait for ApiService {
    async fn call(&self, method: &str, params: ApiParams) -> SlackResult<Value> {
        let request = self.build_request(method, &params)?;
        let span = create_request_span(Surface::WebApi, method);

        async {
            let response = self.transport.execute(request).await?;
            let current = tracing::Span::current();
            record_status(&current, response.status);

            if !response.is_success() {
                let body = String::from_utf8_lossy(&response.body).into_owned();
                record_error(&current, &body);
                return Err(SlackError::Http {
                    status: response.status,
                    body,
                });
            }

            let body = response.json()?;
            if body.get("ok").and_then(Value::as_bool) == Some(false) {
                let err = SlackError::from_api_body(method, &body);
                record_error(&current, &err.to_string());
                return Err(err);
            }

            debug!(method, "Web API call succeeded");
            record_success(&current);
            Ok(body)
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish()
    }
}

/// Text form of a parameter value; arrays and objects become JSON text,
/// `null` is dropped.
pub fn encode_param(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_valid_method(method: &str) -> bool {
    !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}
