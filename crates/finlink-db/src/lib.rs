//! Postgres persistence layer for the finlink mirror.
//!
//! Models follow a thin active-record style: each struct maps to one table
//! and exposes async CRUD methods taking a [`sqlx::PgPool`]. Invariants
//! (one active row per provider transaction ID, one active link per
//! user/institution pair) are enforced by partial unique indexes in the
//! migrations, so concurrent writers fail loudly instead of duplicating.

pub mod error;
pub mod migrations;
pub mod models;

pub use error::{is_unique_violation, DbError};
pub use migrations::run_migrations;
pub use models::{
    Account, AccountWithOwner, CreateLinkedItem, LinkedItem, ListFilter, NewAccount,
    NewTransaction, Transaction, TransactionWithOwner, User, WebhookEvent,
};
