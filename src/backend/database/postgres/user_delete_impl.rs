use async_trait::async_trait;
use sqlx::PgPool;

use super::super::user_delete::UserDeleter;
use crate::error::{AppError, AppResult};

/// PostgreSQL-specific implementation of UserDeleter
pub struct PostgresUserDeleter {
    pool: PgPool,
}

impl PostgresUserDeleter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDeleter for PostgresUserDeleter {
    async fn execute_user_delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
