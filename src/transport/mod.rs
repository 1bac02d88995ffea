//! HTTP transport layer for the Slack client.
//!
//! Provides low-level HTTP communication shared by the Web API, webhook and
//! slackbot surfaces. The transport only moves bytes; interpreting status
//! codes and bodies is left to the services.

use crate::errors::{NetworkError, ResponseError, SlackError, SlackResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// HTTP transport trait for making requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a request and return the raw response
    async fn execute(&self, request: HttpRequest) -> SlackResult<HttpResponse>;
}

/// Request body variants
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON document
    Json(serde_json::Value),
    /// Raw text sent as `text/plain`
    Text(String),
}

/// Outbound HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL, possibly with its own query
    pub url: String,
    /// Extra query parameters appended to the URL
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: RequestBody,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    fn new(method: Method, url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body,
            timeout: None,
        }
    }

    /// Create a new GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url, RequestBody::Empty)
    }

    /// Create a new POST request with a JSON body
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, url, RequestBody::Json(body))
    }

    /// Create a new POST request with a raw text body
    pub fn post_text(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Method::POST, url, RequestBody::Text(body.into()))
    }

    /// Append a query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Merge headers into the request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// URL with the extra query parameters applied
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        match Url::parse(&self.url) {
            Ok(mut url) => {
                url.query_pairs_mut().extend_pairs(self.query.iter());
                url.into()
            }
            Err(_) => self.url.clone(),
        }
    }
}

/// Raw HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response from status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> SlackResult<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|_| SlackError::Response(ResponseError::InvalidEncoding))
    }

    /// Body parsed as JSON
    pub fn json(&self) -> SlackResult<serde_json::Value> {
        serde_json::from_slice(&self.body).map_err(|e| SlackError::Response(e.into()))
    }
}

/// Default HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a new transport with the given timeout
    pub fn new(timeout: Duration) -> SlackResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| SlackError::Network(NetworkError::Http(e.to_string())))?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Create a new transport with a pre-built client
    pub fn with_client(client: Client, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, url = %crate::observability::redact_url(&request.url))
    )]
    async fn execute(&self, request: HttpRequest) -> SlackResult<HttpResponse> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(timeout);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        req_builder = match request.body {
            RequestBody::Empty => req_builder,
            RequestBody::Json(body) => req_builder.json(&body),
            RequestBody::Text(body) => req_builder
                .header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))
                .body(body),
        };

        let response = req_builder
            .send()
            .await
            .map_err(|e| SlackError::Network(NetworkError::from(e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Request failed with non-success status");
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| SlackError::Network(NetworkError::Http(e.to_string())))?;

        debug!(status = status.as_u16(), body_len = body.len(), "Received response");

        Ok(HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
