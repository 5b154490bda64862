//! Webhook event log.
//!
//! Raw payload of every inbound callback, written before any processing.
//! Append-only and write-once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

/// One logged webhook callback.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WebhookEvent {
    pub id: i64,
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl WebhookEvent {
    /// Append a raw payload to the log.
    pub async fn create(pool: &PgPool, payload: &JsonValue) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO webhook_events (payload)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(payload)
        .fetch_one(pool)
        .await
    }
}
