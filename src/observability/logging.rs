//! Logging utilities with sensitive data redaction.

const REDACTED: &str = "[REDACTED]";

/// Redact token from a string, preserving prefix for debugging
pub fn redact_token(token: &str) -> String {
    match token.get(..8) {
        Some(prefix) if token.len() > 8 => format!("{}...{}", prefix, REDACTED),
        _ => REDACTED.to_string(),
    }
}

/// Redact a URL, hiding token query parameters and webhook secrets
pub fn redact_url(url: &str) -> String {
    let (base, query) = match url.find('?') {
        Some(query_start) => url.split_at(query_start),
        None => (url, ""),
    };

    let base = redact_webhook_path(base);
    if query.is_empty() {
        base
    } else {
        format!("{}{}", base, redact_query_params(query))
    }
}

/// Incoming webhook URLs carry their secret as the last path segment
fn redact_webhook_path(base: &str) -> String {
    if !base.contains("hooks.slack.com/services/") {
        return base.to_string();
    }

    let trimmed = base.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => format!("{}/{}", &trimmed[..idx], REDACTED),
        None => base.to_string(),
    }
}

/// Redact sensitive query parameters
fn redact_query_params(query: &str) -> String {
    let sensitive_params = ["token", "key", "secret", "password"];

    let params = query
        .trim_start_matches('?')
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if sensitive_params.iter().any(|s| key.eq_ignore_ascii_case(s)) => {
                format!("{}={}", key, REDACTED)
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>();

    format!("?{}", params.join("&"))
}
