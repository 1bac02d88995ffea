//! Service implementations for the three HTTP surfaces.
//!
//! Each service owns a handle to the shared transport and resolves its own
//! credential through the [`AuthManager`](crate::auth::AuthManager).

pub mod api;
pub mod slackbot;
pub mod webhook;

pub use api::{ApiParams, ApiService, ApiServiceTrait};
pub use slackbot::{SlackbotMessage, SlackbotService, SlackbotServiceTrait};
pub use webhook::{WebhookPayload, WebhookService, WebhookServiceTrait};

use crate::errors::{SlackError, SlackResult};
use crate::observability::{create_request_span, record_error, record_status, record_success, Surface};
use crate::transport::{HttpRequest, HttpTransport};
use tracing::{debug, Instrument};

/// Body the webhook endpoints answer with on success
pub const WEBHOOK_OK: &str = "ok";

/// POST to a webhook-style endpoint: 200 yields the body text, anything
/// else fails with the body embedded.
pub(crate) async fn submit(
    transport: &dyn HttpTransport,
    surface: Surface,
    request: HttpRequest,
) -> SlackResult<String> {
    let span = create_request_span(surface, &crate::observability::redact_url(&request.url));

    async {
        let response = transport.execute(request).await?;
        record_status(&tracing::Span::current(), response.status);

        let body = String::from_utf8_lossy(&response.body).into_owned();
        if response.status != 200 {
            record_error(&tracing::Span::current(), &body);
            return Err(SlackError::Webhook {
                status: response.status,
                body,
            });
        }

        if body != WEBHOOK_OK {
            debug!(body = %body, "Webhook accepted with unexpected body");
        }
        record_success(&tracing::Span::current());
        Ok(body)
    }
    .instrument(span)
    .await
}
