//! Error types for the finlink-db crate.
//!
//! Model methods return raw `sqlx::Error` so callers can classify it
//! themselves; the only error this crate produces in its own right is a
//! migration failure.

use thiserror::Error;

/// Database setup errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),
}

/// Check a borrowed sqlx error for a unique constraint violation.
///
/// Used by the reconcilers to recognize the benign race where two
/// concurrent runs insert the same provider identifier.
#[must_use]
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
