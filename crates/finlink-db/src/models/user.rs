//! Minimal user model.
//!
//! Account and session management live outside this service; this table
//! exists so linked items have an owner and the read API can filter by
//! `user_id` and `username`.

use chrono::{DateTime, Utc};
use finlink_core::UserId;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// An application user that owns linked items.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user row.
    pub async fn create(pool: &PgPool, id: UserId, username: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .fetch_one(pool)
        .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    // CRUD behavior is covered by the database integration suites.
}
