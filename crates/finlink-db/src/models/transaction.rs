//! Transaction model.
//!
//! Transactions are created by the transaction reconciler with provider
//! fields copied verbatim and are never updated in place. The only mutation
//! is the bulk soft-delete driven by `TRANSACTIONS_REMOVED` webhooks;
//! deactivated rows are retained for audit history.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use finlink_core::{LinkedItemId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::{bind_filter, push_filter_clauses, ListFilter};

/// A mirrored transaction belonging to one linked item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: i64,
    pub linked_item_id: LinkedItemId,
    pub account_id: String,
    pub account_ref: Option<i64>,
    pub account_owner: Option<String>,
    pub transaction_id: String,
    pub amount: Decimal,
    pub name: String,
    pub merchant_name: Option<String>,
    pub category_id: Option<String>,
    pub category: Option<JsonValue>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    pub location: JsonValue,
    pub payment_channel: String,
    pub pending: bool,
    pub payment_meta: JsonValue,
    pub active: bool,
    pub date: NaiveDate,
    pub authorized_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a mirrored transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub linked_item_id: LinkedItemId,
    pub account_id: String,
    pub account_ref: Option<i64>,
    pub account_owner: Option<String>,
    pub transaction_id: String,
    pub amount: Decimal,
    pub name: String,
    pub merchant_name: Option<String>,
    pub category_id: Option<String>,
    pub category: Option<JsonValue>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    pub location: JsonValue,
    pub payment_channel: String,
    pub pending: bool,
    pub payment_meta: JsonValue,
    pub date: NaiveDate,
    pub authorized_date: Option<NaiveDate>,
}

/// A transaction row joined with its owning item and user, as served by the
/// read API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TransactionWithOwner {
    pub id: i64,
    pub linked_item_id: LinkedItemId,
    pub user_id: UserId,
    pub username: String,
    pub institution_id: String,
    pub account_id: String,
    pub account_owner: Option<String>,
    pub transaction_id: String,
    pub amount: Decimal,
    pub name: String,
    pub merchant_name: Option<String>,
    pub category_id: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Value>))]
    pub category: Option<JsonValue>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub location: JsonValue,
    pub payment_channel: String,
    pub pending: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub payment_meta: JsonValue,
    pub active: bool,
    pub date: NaiveDate,
    pub authorized_date: Option<NaiveDate>,
}

const LIST_SELECT: &str = r#"
    SELECT t.id, t.linked_item_id, li.user_id, u.username, li.institution_id,
           t.account_id, t.account_owner, t.transaction_id, t.amount, t.name,
           t.merchant_name, t.category_id, t.category, t.iso_currency_code,
           t.unofficial_currency_code, t.location, t.payment_channel,
           t.pending, t.payment_meta, t.active, t.date, t.authorized_date
    FROM transactions t
    JOIN linked_items li ON li.id = t.linked_item_id
    JOIN users u ON u.id = li.user_id
"#;

const COUNT_SELECT: &str = r#"
    SELECT COUNT(*)
    FROM transactions t
    JOIN linked_items li ON li.id = t.linked_item_id
    JOIN users u ON u.id = li.user_id
"#;

impl Transaction {
    /// Insert a mirrored transaction with `active = true`.
    ///
    /// Fails with a unique violation if an active row for the same provider
    /// transaction ID already exists; the reconciler treats that as the
    /// benign concurrent-insert race and skips the row.
    pub async fn create(pool: &PgPool, input: &NewTransaction) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO transactions (
                linked_item_id, account_id, account_ref, account_owner,
                transaction_id, amount, name, merchant_name, category_id,
                category, iso_currency_code, unofficial_currency_code,
                location, payment_channel, pending, payment_meta, date,
                authorized_date
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18
            )
            RETURNING *
            "#,
        )
        .bind(input.linked_item_id)
        .bind(&input.account_id)
        .bind(input.account_ref)
        .bind(&input.account_owner)
        .bind(&input.transaction_id)
        .bind(input.amount)
        .bind(&input.name)
        .bind(&input.merchant_name)
        .bind(&input.category_id)
        .bind(&input.category)
        .bind(&input.iso_currency_code)
        .bind(&input.unofficial_currency_code)
        .bind(&input.location)
        .bind(&input.payment_channel)
        .bind(input.pending)
        .bind(&input.payment_meta)
        .bind(input.date)
        .bind(input.authorized_date)
        .fetch_one(pool)
        .await
    }

    /// Provider IDs of active transactions for an item dated on or after
    /// `start_date`.
    ///
    /// Deliberately unbounded above: the local set is a superset of any
    /// reconciliation window ending today.
    pub async fn active_ids_since(
        pool: &PgPool,
        linked_item_id: LinkedItemId,
        start_date: NaiveDate,
    ) -> Result<HashSet<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT transaction_id FROM transactions
            WHERE linked_item_id = $1 AND date >= $2 AND active
            "#,
        )
        .bind(linked_item_id)
        .bind(start_date)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Soft-delete all currently-active rows with the given provider IDs in
    /// one bulk update. Returns the number of rows deactivated.
    ///
    /// Previously-inactive or unknown identifiers are simply not matched;
    /// they are not an error.
    pub async fn deactivate_many(
        pool: &PgPool,
        transaction_ids: &[String],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET active = FALSE, updated_at = NOW()
            WHERE transaction_id = ANY($1) AND active
            "#,
        )
        .bind(transaction_ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List transactions for the read API, ordered by insertion ID ascending.
    pub async fn list(
        pool: &PgPool,
        filter: &ListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionWithOwner>, sqlx::Error> {
        let mut query = String::from(LIST_SELECT);
        let param_idx = push_filter_clauses(&mut query, filter, "t");
        query.push_str(&format!(
            " ORDER BY t.id ASC LIMIT ${} OFFSET ${}",
            param_idx,
            param_idx + 1
        ));

        let q = sqlx::query_as::<_, TransactionWithOwner>(&query);
        bind_filter!(q, filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count transactions matching the filter.
    pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
        let mut query = String::from(COUNT_SELECT);
        push_filter_clauses(&mut query, filter, "t");

        let q = sqlx::query_scalar::<_, i64>(&query);
        bind_filter!(q, filter).fetch_one(pool).await
    }
}
