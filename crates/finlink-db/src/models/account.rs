//! Account model.
//!
//! Accounts are created by the account reconciler and immutable afterwards;
//! the provider never reports account removals on this surface, so there is
//! no deactivation path and `active` stays true.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use finlink_core::{LinkedItemId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{bind_filter, push_filter_clauses, ListFilter};

/// A mirrored bank account belonging to one linked item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub linked_item_id: LinkedItemId,
    pub account_id: String,
    pub mask: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub account_subtype: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a mirrored account, copied 1:1 from the provider
/// snapshot.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub linked_item_id: LinkedItemId,
    pub account_id: String,
    pub mask: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub account_subtype: Option<String>,
}

/// An account row joined with its owning item and user, as served by the
/// read API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccountWithOwner {
    pub id: i64,
    pub linked_item_id: LinkedItemId,
    pub user_id: UserId,
    pub username: String,
    pub institution_id: String,
    pub account_id: String,
    pub mask: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub account_subtype: Option<String>,
    pub active: bool,
}

const LIST_SELECT: &str = r#"
    SELECT a.id, a.linked_item_id, li.user_id, u.username, li.institution_id,
           a.account_id, a.mask, a.name, a.official_name, a.account_type,
           a.account_subtype, a.active
    FROM accounts a
    JOIN linked_items li ON li.id = a.linked_item_id
    JOIN users u ON u.id = li.user_id
"#;

const COUNT_SELECT: &str = r#"
    SELECT COUNT(*)
    FROM accounts a
    JOIN linked_items li ON li.id = a.linked_item_id
    JOIN users u ON u.id = li.user_id
"#;

impl Account {
    /// Insert a mirrored account.
    ///
    /// Fails with a unique violation if the provider account ID already
    /// exists for this item.
    pub async fn create(pool: &PgPool, input: &NewAccount) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO accounts (
                linked_item_id, account_id, mask, name, official_name,
                account_type, account_subtype
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.linked_item_id)
        .bind(&input.account_id)
        .bind(&input.mask)
        .bind(&input.name)
        .bind(&input.official_name)
        .bind(&input.account_type)
        .bind(&input.account_subtype)
        .fetch_one(pool)
        .await
    }

    /// Load stored accounts for an item keyed by provider account ID.
    ///
    /// The map value is the local row ID, used to link transactions to
    /// their account row on insert.
    pub async fn provider_id_map(
        pool: &PgPool,
        linked_item_id: LinkedItemId,
    ) -> Result<HashMap<String, i64>, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT account_id, id FROM accounts WHERE linked_item_id = $1
            "#,
        )
        .bind(linked_item_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// List accounts for the read API, ordered by insertion ID ascending.
    pub async fn list(
        pool: &PgPool,
        filter: &ListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AccountWithOwner>, sqlx::Error> {
        let mut query = String::from(LIST_SELECT);
        let param_idx = push_filter_clauses(&mut query, filter, "a");
        query.push_str(&format!(
            " ORDER BY a.id ASC LIMIT ${} OFFSET ${}",
            param_idx,
            param_idx + 1
        ));

        let q = sqlx::query_as::<_, AccountWithOwner>(&query);
        bind_filter!(q, filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count accounts matching the filter.
    pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
        let mut query = String::from(COUNT_SELECT);
        push_filter_clauses(&mut query, filter, "a");

        let q = sqlx::query_scalar::<_, i64>(&query);
        bind_filter!(q, filter).fetch_one(pool).await
    }
}
