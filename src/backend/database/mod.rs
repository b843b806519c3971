//! Database abstraction layer for the user store
//!
//! Each operation is split into shared processing and a database-specific
//! adapter:
//!
//! ```text
//! Common Logic (user_insert.rs, user_read.rs, user_update.rs, user_delete.rs)
//!     ↓
//! Database-specific implementations
//!     ├── postgres/ (PostgreSQL-specific code)
//!     └── sqlite/   (SQLite-specific code)
//! ```

pub mod config;
pub mod postgres;
pub mod sqlite;
pub mod user_delete;
pub mod user_insert;
pub mod user_read;
pub mod user_update;

use crate::error::{AppError, AppResult, ConflictError};

pub use config::DatabaseBackendConfig;

pub use user_delete::UnifiedUserDeleteOps;
pub use user_insert::UnifiedUserInsertOps;
pub use user_read::UnifiedUserReadOps;
pub use user_update::UnifiedUserUpdateOps;

pub use postgres::{
    PostgresBackend, PostgresUserDeleter, PostgresUserInserter, PostgresUserReader,
    PostgresUserUpdater,
};
pub use sqlite::{
    SqliteBackend, SqliteUserDeleter, SqliteUserInserter, SqliteUserReader, SqliteUserUpdater,
};

/// Reject empty or whitespace-only identifiers before they reach SQL
pub fn validate_user_id(id: &str) -> AppResult<()> {
    if id.trim().is_empty() {
        return Err(AppError::BadRequest("Missing user ID".to_string()));
    }
    Ok(())
}

/// Map a sqlx error to an [`AppError`].
///
/// Unique-index violations become `on_unique`; everything else is reported
/// as a database failure tagged with `context`.
pub fn map_database_error(error: sqlx::Error, context: &str, on_unique: ConflictError) -> AppError {
    if let sqlx::Error::Database(ref db_error) = error {
        if db_error.is_unique_violation() {
            return AppError::Conflict(on_unique);
        }
    }
    AppError::Database(format!("Failed to {}: {}", context, error))
}
