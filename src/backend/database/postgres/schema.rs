use crate::error::{AppError, AppResult};
use sqlx::PgPool;

/// Create the users table and its indexes for PostgreSQL
///
/// Emails are stored normalized; the UNIQUE constraint on `email` is the last
/// line of the uniqueness invariant when concurrent requests race.
pub async fn init_schema(pool: &PgPool) -> AppResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at)")
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;

    Ok(())
}
