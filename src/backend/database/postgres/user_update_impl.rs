use async_trait::async_trait;
use sqlx::PgPool;

use super::super::map_database_error;
use super::super::user_update::{PreparedPasswordUpdate, PreparedUserUpdateData, UserUpdater};
use super::user_read_impl::{row_to_user, USER_COLUMNS};
use crate::error::{AppError, AppResult, ConflictError};
use crate::models::User;

/// PostgreSQL-specific implementation of UserUpdater
pub struct PostgresUserUpdater {
    pool: PgPool,
}

impl PostgresUserUpdater {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserUpdater for PostgresUserUpdater {
    async fn execute_user_update(&self, data: PreparedUserUpdateData) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET email = COALESCE($1, email), name = COALESCE($2, name), updated_at = $3 WHERE id = $4 RETURNING {}",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&data.email)
            .bind(&data.name)
            .bind(data.timestamp)
            .bind(&data.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "update user", ConflictError::EmailInUse))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn execute_password_update(
        &self,
        data: PreparedPasswordUpdate,
    ) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET password = $1, updated_at = $2 WHERE id = $3 RETURNING {}",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&data.password)
            .bind(data.timestamp)
            .bind(&data.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update password: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }
}
