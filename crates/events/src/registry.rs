//! Where the dispatcher looks up targets for a change.
//!
//! Every implementation filters with [`WebhookConfig::matches`], so storage
//! choice never changes which targets an event reaches. An empty result
//! means "nothing registered"; a storage failure is a [`RegistryError`].

use async_trait::async_trait;
use sitecache_core::change_event::ChangeAction;
use sitecache_core::webhook_config::WebhookConfig;
use sitecache_db::repositories::WebhookConfigRepo;
use sitecache_db::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry query failed: {0}")]
    Query(#[from] sqlx::Error),
}

#[async_trait]
pub trait WebhookRegistry: Send + Sync {
    /// Active configs registered for `collection` that accept `action`.
    async fn find_active_configs_for(
        &self,
        collection: &str,
        action: ChangeAction,
    ) -> Result<Vec<WebhookConfig>, RegistryError>;
}

// ---------------------------------------------------------------------------
// InMemoryRegistry
// ---------------------------------------------------------------------------

/// Fixed set of configs held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    configs: Vec<WebhookConfig>,
}

impl InMemoryRegistry {
    pub fn new(configs: Vec<WebhookConfig>) -> Self {
        Self { configs }
    }
}

#[async_trait]
impl WebhookRegistry for InMemoryRegistry {
    async fn find_active_configs_for(
        &self,
        collection: &str,
        action: ChangeAction,
    ) -> Result<Vec<WebhookConfig>, RegistryError> {
        Ok(self
            .configs
            .iter()
            .filter(|c| c.matches(collection, action))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// PgWebhookRegistry
// ---------------------------------------------------------------------------

/// Configs stored in the `webhook_configs` table.
#[derive(Clone)]
pub struct PgWebhookRegistry {
    pool: DbPool,
}

impl PgWebhookRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookRegistry for PgWebhookRegistry {
    async fn find_active_configs_for(
        &self,
        collection: &str,
        action: ChangeAction,
    ) -> Result<Vec<WebhookConfig>, RegistryError> {
        let rows = WebhookConfigRepo::list_active_for_collection(&self.pool, collection).await?;

        let mut configs = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match row.into_config() {
                Ok(config) if config.matches(collection, action) => configs.push(config),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(id, error = %e, "Skipping malformed webhook config");
                }
            }
        }
        Ok(configs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::new(vec![
            WebhookConfig::new("all blogs", "blogs", "https://a.example/hook"),
            WebhookConfig::new("blog creates", "blogs", "https://b.example/hook")
                .with_event_types([ChangeAction::Create]),
            WebhookConfig::new("disabled", "blogs", "https://c.example/hook").with_active(false),
            WebhookConfig::new("jobs", "jobs", "https://d.example/hook"),
        ])
    }

    fn names(configs: &[WebhookConfig]) -> Vec<&str> {
        configs.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn returns_matching_active_configs() {
        let found = registry()
            .find_active_configs_for("blogs", ChangeAction::Create)
            .await
            .unwrap();
        assert_eq!(names(&found), ["all blogs", "blog creates"]);
    }

    #[tokio::test]
    async fn unmatched_event_type_is_excluded() {
        let found = registry()
            .find_active_configs_for("blogs", ChangeAction::Delete)
            .await
            .unwrap();
        assert_eq!(names(&found), ["all blogs"]);
    }

    #[tokio::test]
    async fn unknown_collection_yields_empty_ok() {
        let found = registry()
            .find_active_configs_for("newsletters", ChangeAction::Update)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
