//! Single-attempt webhook delivery.
//!
//! [`WebhookDelivery`] POSTs a serialized [`ChangeEvent`] body to one
//! [`WebhookConfig`] destination. There is no retry: a missed delivery is
//! caught by the receiver's scheduled sweeps and cache TTL instead.
//!
//! [`ChangeEvent`]: sitecache_core::change_event::ChangeEvent

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use sitecache_core::secret::{sign_payload, DELIVERY_ID_HEADER, SIGNATURE_HEADER};
use sitecache_core::webhook_config::WebhookConfig;
use uuid::Uuid;

/// HTTP request timeout for a single delivery attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    /// A configured header name or value cannot be sent over HTTP.
    #[error("Invalid header '{0}'")]
    InvalidHeader(String),
}

impl DeliveryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers change events to external webhook endpoints.
#[derive(Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
}

impl WebhookDelivery {
    /// Create a delivery service whose attempts are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Execute one POST of `body` to the config's destination.
    ///
    /// Returns the delivery id sent in `x-webhook-delivery` on success.
    pub async fn deliver(&self, config: &WebhookConfig, body: &[u8]) -> Result<Uuid, DeliveryError> {
        let delivery_id = Uuid::new_v4();
        let headers = build_headers(config, body, delivery_id)?;

        let response = self
            .client
            .post(&config.destination)
            .headers(headers)
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::HttpStatus(status.as_u16()));
        }

        tracing::debug!(
            webhook = %config.name,
            %delivery_id,
            status = status.as_u16(),
            "Webhook delivered"
        );
        Ok(delivery_id)
    }
}

/// Assemble outbound headers.
///
/// Order of precedence, lowest first: defaults (`content-type`, delivery
/// id), then the config's own headers, then the body signature.
fn build_headers(
    config: &WebhookConfig,
    body: &[u8],
    delivery_id: Uuid,
) -> Result<HeaderMap, DeliveryError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(DELIVERY_ID_HEADER),
        HeaderValue::from_str(&delivery_id.to_string())
            .map_err(|_| DeliveryError::InvalidHeader(DELIVERY_ID_HEADER.into()))?,
    );

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| DeliveryError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| DeliveryError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }

    if let Some(secret) = config.signing_secret.as_deref() {
        let signature = sign_payload(secret, body);
        headers.insert(
            HeaderName::from_static(SIGNATURE_HEADER),
            HeaderValue::from_str(&signature)
                .map_err(|_| DeliveryError::InvalidHeader(SIGNATURE_HEADER.into()))?,
        );
    }

    Ok(headers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sitecache_core::secret::verify_payload_signature;

    fn config() -> WebhookConfig {
        WebhookConfig::new("blogs hook", "blogs", "http://127.0.0.1:9/hook")
    }

    #[test]
    fn new_builds_client() {
        assert!(WebhookDelivery::new(DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn default_headers_are_present() {
        let id = Uuid::new_v4();
        let headers = build_headers(&config(), b"{}", id).unwrap();

        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[DELIVERY_ID_HEADER], id.to_string().as_str());
        assert!(headers.get(SIGNATURE_HEADER).is_none());
    }

    #[test]
    fn config_headers_win_on_collision() {
        let cfg = config()
            .with_header("content-type", "application/vnd.site+json")
            .with_header("x-webhook-secret", "s3cret");
        let headers = build_headers(&cfg, b"{}", Uuid::new_v4()).unwrap();

        assert_eq!(headers[CONTENT_TYPE], "application/vnd.site+json");
        assert_eq!(headers["x-webhook-secret"], "s3cret");
    }

    #[test]
    fn signing_secret_adds_verifiable_signature() {
        let body = br#"{"action":"create","collection":"blogs","record":{}}"#;
        let cfg = config().with_signing_secret("sign-key");
        let headers = build_headers(&cfg, body, Uuid::new_v4()).unwrap();

        let sig = headers[SIGNATURE_HEADER].to_str().unwrap();
        assert!(verify_payload_signature("sign-key", body, sig));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let cfg = config().with_header("bad header", "v");
        assert_matches!(
            build_headers(&cfg, b"{}", Uuid::new_v4()),
            Err(DeliveryError::InvalidHeader(name)) if name == "bad header"
        );
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let cfg = config().with_header("x-token", "line\nbreak");
        assert_matches!(
            build_headers(&cfg, b"{}", Uuid::new_v4()),
            Err(DeliveryError::InvalidHeader(_))
        );
    }

    #[test]
    fn http_status_error_display() {
        assert_eq!(DeliveryError::HttpStatus(502).to_string(), "Webhook returned HTTP 502");
    }
}
