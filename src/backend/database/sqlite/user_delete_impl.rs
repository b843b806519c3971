use async_trait::async_trait;
use sqlx::SqlitePool;

use super::super::user_delete::UserDeleter;
use crate::error::{AppError, AppResult};

/// SQLite-specific implementation of UserDeleter
pub struct SqliteUserDeleter {
    pool: SqlitePool,
}

impl SqliteUserDeleter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDeleter for SqliteUserDeleter {
    async fn execute_user_delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
