//! Repository for the `webhook_configs` table.

use sitecache_core::error::CoreError;
use sitecache_core::types::DbId;
use sitecache_core::webhook_config::WebhookConfig;
use sqlx::PgPool;

use crate::models::webhook_config::{event_types_column, headers_column, WebhookConfigRow};

/// Column list for webhook_configs queries.
const COLUMNS: &str = "id, name, collection, destination, headers, active, event_types, \
    signing_secret, created_at, updated_at";

/// Errors from writes that validate their input first.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides CRUD operations for outbound webhook registrations.
pub struct WebhookConfigRepo;

impl WebhookConfigRepo {
    /// Validate and insert a registration, returning the created row.
    pub async fn create(
        pool: &PgPool,
        config: &WebhookConfig,
    ) -> Result<WebhookConfigRow, RepoError> {
        config.check()?;

        let query = format!(
            "INSERT INTO webhook_configs
                (name, collection, destination, headers, active, event_types, signing_secret)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, WebhookConfigRow>(&query)
            .bind(&config.name)
            .bind(&config.collection)
            .bind(&config.destination)
            .bind(headers_column(config))
            .bind(config.active)
            .bind(event_types_column(config))
            .bind(&config.signing_secret)
            .fetch_one(pool)
            .await?;

        tracing::info!(
            id = row.id,
            name = %row.name,
            collection = %row.collection,
            "Webhook config created"
        );
        Ok(row)
    }

    /// Active registrations for one collection (case-sensitive), oldest first.
    ///
    /// Event-type filtering is left to [`WebhookConfig::matches`] so every
    /// registry applies the same predicate.
    pub async fn list_active_for_collection(
        pool: &PgPool,
        collection: &str,
    ) -> Result<Vec<WebhookConfigRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhook_configs \
             WHERE collection = $1 AND active \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, WebhookConfigRow>(&query)
            .bind(collection)
            .fetch_all(pool)
            .await
    }

    /// All registrations, grouped by collection.
    pub async fn list(pool: &PgPool) -> Result<Vec<WebhookConfigRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM webhook_configs ORDER BY collection ASC, id ASC");
        sqlx::query_as::<_, WebhookConfigRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Enable or disable a registration. Returns `true` if a row was updated.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE webhook_configs SET active = $1, updated_at = now() WHERE id = $2",
        )
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a registration. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM webhook_configs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
