//! HTTP utilities for upstream providers
//!
//! Shared client construction and error shaping for outbound calls.

use reqwest::{Client as HttpClient, Response};
use std::time::Duration;

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Creates an HTTP client with the given request timeout.
///
/// This prevents infinite hangs when an API is slow or unresponsive.
#[must_use]
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Turns a non-success response into a readable message.
///
/// Returns `Ok(response)` untouched when the status is 2xx.
///
/// # Errors
///
/// Returns the formatted message (status plus a bounded excerpt of the body)
/// for any other status.
pub async fn check_status(response: Response) -> Result<Response, String> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(describe_error_body(status.as_u16(), &error_text))
}

/// Formats an error body, dropping HTML pages and truncating long text.
#[must_use]
pub fn describe_error_body(status: u16, body: &str) -> String {
    let trimmed = body.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return format!("HTTP {status} (server returned HTML error page)");
    }

    if body.chars().count() > 500 {
        let truncated: String = body.chars().take(500).collect();
        format!("HTTP {status} - {truncated}... (truncated)")
    } else {
        format!("HTTP {status} - {body}")
    }
}
