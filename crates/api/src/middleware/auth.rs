//! Secret-based authorization extractors.
//!
//! Each endpoint family has its own secret and extractor. A secret that is
//! not configured rejects every request. All comparisons go through
//! [`verify_shared_secret`] and never reveal which part of a guess was wrong.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sitecache_core::error::CoreError;
use sitecache_core::secret::{verify_shared_secret, WEBHOOK_SECRET_HEADER};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying a revalidation or admin key.
pub const API_KEY_HEADER: &str = "x-api-key";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, AUTHORIZATION.as_str())?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// `x-api-key` takes precedence over `Authorization: Bearer`.
fn api_key(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, API_KEY_HEADER).or_else(|| bearer_token(headers))
}

fn authorize(
    provided: Option<&str>,
    expected: Option<&str>,
    endpoint: &'static str,
) -> Result<(), AppError> {
    let Some(expected) = expected else {
        tracing::warn!(endpoint, "Rejected request: secret not configured");
        return Err(unauthorized());
    };

    if verify_shared_secret(provided, expected).is_authorized() {
        Ok(())
    } else {
        tracing::warn!(endpoint, provided = provided.is_some(), "Rejected request: bad secret");
        Err(unauthorized())
    }
}

fn unauthorized() -> AppError {
    AppError::Core(CoreError::Unauthorized("Unauthorized".into()))
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// Inbound webhook carrying `x-webhook-secret` == `WEBHOOK_SECRET`.
///
/// Body signatures are checked by the handler, which owns the body.
#[derive(Debug, Clone, Copy)]
pub struct WebhookSecret;

impl FromRequestParts<AppState> for WebhookSecret {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(
            header_str(&parts.headers, WEBHOOK_SECRET_HEADER),
            state.config.webhook_secret.as_deref(),
            "webhook",
        )?;
        Ok(WebhookSecret)
    }
}

/// Manual revalidation caller holding `REVALIDATION_API_KEY`.
#[derive(Debug, Clone, Copy)]
pub struct RevalidationKey;

impl FromRequestParts<AppState> for RevalidationKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(
            api_key(&parts.headers),
            state.config.revalidation_api_key.as_deref(),
            "revalidate",
        )?;
        Ok(RevalidationKey)
    }
}

/// Administrator holding `ADMIN_API_KEY`. The revalidation key does not
/// satisfy this extractor.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

impl FromRequestParts<AppState> for AdminKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(
            api_key(&parts.headers),
            state.config.admin_api_key.as_deref(),
            "revalidate/all",
        )?;
        Ok(AdminKey)
    }
}

/// Scheduler call carrying `Authorization: Bearer <CRON_SECRET>`.
#[derive(Debug, Clone, Copy)]
pub struct CronSecret;

impl FromRequestParts<AppState> for CronSecret {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(
            bearer_token(&parts.headers),
            state.config.cron_secret.as_deref(),
            "cron",
        )?;
        Ok(CronSecret)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn api_key_prefers_x_api_key() {
        let h = headers(&[("x-api-key", "k1"), ("authorization", "Bearer k2")]);
        assert_eq!(api_key(&h), Some("k1"));
    }

    #[test]
    fn api_key_falls_back_to_bearer() {
        let h = headers(&[("authorization", "Bearer k2")]);
        assert_eq!(api_key(&h), Some("k2"));
    }

    #[test]
    fn bearer_requires_scheme() {
        let h = headers(&[("authorization", "k2")]);
        assert_eq!(bearer_token(&h), None);
    }

    #[test]
    fn unset_secret_rejects() {
        assert!(authorize(Some("anything"), None, "test").is_err());
    }

    #[test]
    fn matching_secret_is_accepted() {
        assert!(authorize(Some("s3cret"), Some("s3cret"), "test").is_ok());
        assert!(authorize(Some("nope"), Some("s3cret"), "test").is_err());
        assert!(authorize(None, Some("s3cret"), "test").is_err());
    }
}
