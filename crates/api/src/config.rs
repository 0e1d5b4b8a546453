/// Server configuration loaded from environment variables.
///
/// Secrets are `None` when unset or blank. An endpoint whose secret is
/// `None` rejects every request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `5`).
    pub request_timeout_secs: u64,
    /// Base URL of the record data service.
    pub data_service_url: String,
    /// Shared secret expected in `x-webhook-secret`.
    pub webhook_secret: Option<String>,
    /// When set, inbound webhooks must also carry a valid body signature.
    pub webhook_signing_secret: Option<String>,
    /// Key for the collection/tag/path revalidation endpoints.
    pub revalidation_api_key: Option<String>,
    /// Key for the full-flush endpoint.
    pub admin_api_key: Option<String>,
    /// Bearer secret for the cron endpoint.
    pub cron_secret: Option<String>,
    /// Page cache TTL in seconds (default: `3600`).
    pub cache_ttl_secs: u64,
    /// Minimum seconds between two full flushes (default: `300`).
    pub full_flush_min_interval_secs: u64,
    /// Run scheduled sweeps in-process (default: `false`).
    pub sweep_schedule_enabled: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                  |
    /// |--------------------------------|--------------------------|
    /// | `HOST`                         | `0.0.0.0`                |
    /// | `PORT`                         | `3000`                   |
    /// | `REQUEST_TIMEOUT_SECS`         | `5`                      |
    /// | `DATA_SERVICE_URL`             | `http://127.0.0.1:8090`  |
    /// | `WEBHOOK_SECRET`               | unset                    |
    /// | `WEBHOOK_SIGNING_SECRET`       | unset                    |
    /// | `REVALIDATION_API_KEY`         | unset                    |
    /// | `ADMIN_API_KEY`                | unset                    |
    /// | `CRON_SECRET`                  | unset                    |
    /// | `CACHE_TTL_SECS`               | `3600`                   |
    /// | `FULL_FLUSH_MIN_INTERVAL_SECS` | `300`                    |
    /// | `SWEEP_SCHEDULE_ENABLED`       | `false`                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let data_service_url = std::env::var("DATA_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8090".into())
            .trim_end_matches('/')
            .to_string();

        let cache_ttl_secs: u64 = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("CACHE_TTL_SECS must be a valid u64");

        let full_flush_min_interval_secs: u64 = std::env::var("FULL_FLUSH_MIN_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("FULL_FLUSH_MIN_INTERVAL_SECS must be a valid u64");

        let sweep_schedule_enabled = std::env::var("SWEEP_SCHEDULE_ENABLED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host,
            port,
            request_timeout_secs,
            data_service_url,
            webhook_secret: secret_var("WEBHOOK_SECRET"),
            webhook_signing_secret: secret_var("WEBHOOK_SIGNING_SECRET"),
            revalidation_api_key: secret_var("REVALIDATION_API_KEY"),
            admin_api_key: secret_var("ADMIN_API_KEY"),
            cron_secret: secret_var("CRON_SECRET"),
            cache_ttl_secs,
            full_flush_min_interval_secs,
            sweep_schedule_enabled,
        }
    }

    /// Names of secrets that are unset, for a startup warning.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        [
            ("WEBHOOK_SECRET", &self.webhook_secret),
            ("REVALIDATION_API_KEY", &self.revalidation_api_key),
            ("ADMIN_API_KEY", &self.admin_api_key),
            ("CRON_SECRET", &self.cron_secret),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

fn secret_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
