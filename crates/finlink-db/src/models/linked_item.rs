//! Linked item model.
//!
//! One row per user-institution pairing, created on successful token
//! exchange. Rows are never hard-deleted; a superseded link is flipped to
//! inactive. The partial unique index on `(user_id, institution_id) WHERE
//! active` keeps at most one live link per pairing.

use chrono::{DateTime, Utc};
use finlink_core::{LinkedItemId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A user's connection to one financial institution via the provider.
///
/// `access_token` is the opaque provider credential scoped to this item;
/// it is only ever read by reconciliation code operating on this item and
/// is deliberately excluded from serialized output.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LinkedItem {
    pub id: LinkedItemId,
    pub user_id: UserId,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub item_id: String,
    pub request_id: String,
    pub institution_id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a linked item after a successful token exchange.
#[derive(Debug, Clone)]
pub struct CreateLinkedItem {
    pub user_id: UserId,
    pub institution_id: String,
    pub access_token: String,
    pub item_id: String,
    pub request_id: String,
}

impl LinkedItem {
    /// Create a new linked item.
    ///
    /// Fails with a unique violation if an active link for the same
    /// (user, institution) pair already exists.
    pub async fn create(pool: &PgPool, input: &CreateLinkedItem) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO linked_items (
                id, user_id, access_token, item_id, request_id, institution_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(LinkedItemId::new())
        .bind(input.user_id)
        .bind(&input.access_token)
        .bind(&input.item_id)
        .bind(&input.request_id)
        .bind(&input.institution_id)
        .fetch_one(pool)
        .await
    }

    /// Find a linked item by its local ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: LinkedItemId,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM linked_items WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Find a linked item by the provider-assigned item identifier.
    ///
    /// Webhook payloads carry the provider's `item_id`, not our key.
    pub async fn find_by_item_id(
        pool: &PgPool,
        item_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM linked_items WHERE item_id = $1 AND active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .fetch_optional(pool)
        .await
    }

    /// Find the active link for a (user, institution) pair, if any.
    ///
    /// Used by the exchange-token idempotency check: an existing active
    /// link means the exchange is skipped and the item is re-synced.
    pub async fn find_active(
        pool: &PgPool,
        user_id: UserId,
        institution_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM linked_items
            WHERE user_id = $1 AND institution_id = $2 AND active
            "#,
        )
        .bind(user_id)
        .bind(institution_id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_not_serialized() {
        let item = LinkedItem {
            id: LinkedItemId::new(),
            user_id: UserId::new(),
            access_token: "access-sandbox-secret".to_string(),
            item_id: "item-1".to_string(),
            request_id: "req-1".to_string(),
            institution_id: "ins_1".to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("access-sandbox-secret"));
        assert!(json.contains("item-1"));
    }
}
