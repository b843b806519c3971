use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

/// Create the users table and its indexes.
///
/// `email` carries a UNIQUE constraint: emails are stored normalized, so the
/// constraint enforces uniqueness under normalization even when two writers
/// pass the service-level lookup at the same time.
pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
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

/// Drop the schema (for cleanup/testing)
pub async fn drop_schema(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query("DROP TABLE IF EXISTS users")
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to drop table users: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_schema_creation() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        init_schema(&pool).await.unwrap();
        // idempotent
        init_schema(&pool).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        drop_schema(&pool).await.unwrap();
        assert!(sqlx::query("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();

        let insert = "INSERT INTO users (id, email, name, password, created_at, updated_at) VALUES (?1, ?2, 'n', 'p', 't', 't')";
        sqlx::query(insert)
            .bind("1")
            .bind("a@example.com")
            .execute(&pool)
            .await
            .unwrap();

        let err = sqlx::query(insert)
            .bind("2")
            .bind("a@example.com")
            .execute(&pool)
            .await
            .unwrap_err();
        match err {
            sqlx::Error::Database(db) => assert!(db.is_unique_violation()),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
