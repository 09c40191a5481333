//! HTTP utilities for API providers

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::EmbeddingError;

/// Create a reqwest client with connection pooling and sensible defaults
///
/// The client is configured with:
/// - Connection pooling (max 10 idle connections per host)
/// - 120 second request timeout
/// - 30 second connect timeout
pub fn create_client() -> reqwest::Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(30))
        .build()
}

/// Check HTTP response status and return detailed error if not successful
///
/// This helper extracts error details from the response body for better debugging.
pub async fn check_response(
    response: Response,
    service_name: &str,
) -> Result<Response, EmbeddingError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    Err(EmbeddingError::Request(format!(
        "{} API error {}: {}",
        service_name,
        status,
        error_detail(body)
    )))
}

/// Pull the message out of common JSON error formats
fn error_detail(body: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => json
            .get("error")
            .and_then(|e| e.get("message").and_then(|m| m.as_str()).or_else(|| e.as_str()))
            .or_else(|| json.get("message").and_then(|m| m.as_str()))
            .or_else(|| json.get("detail").and_then(|d| d.as_str()))
            .map(|s| s.to_string())
            .unwrap_or(body),
        Err(_) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        assert!(create_client().is_ok());
    }

    #[test]
    fn test_error_detail_formats() {
        assert_eq!(
            error_detail(r#"{"error":{"message":"bad key"}}"#.to_string()),
            "bad key"
        );
        assert_eq!(
            error_detail(r#"{"error":"model not found"}"#.to_string()),
            "model not found"
        );
        assert_eq!(error_detail("plain text".to_string()), "plain text");
    }
}
