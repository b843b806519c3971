use async_trait::async_trait;
use sqlx::PgPool;

use super::super::map_database_error;
use super::super::user_insert::{PreparedUserData, UserInsertProcessor, UserInserter};
use crate::error::{AppError, AppResult, ConflictError};
use crate::models::User;

const INSERT_USER_SQL: &str = "INSERT INTO users (id, email, name, password, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $5)";

/// PostgreSQL-specific implementation of UserInserter
pub struct PostgresUserInserter {
    pool: PgPool,
}

impl PostgresUserInserter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserInserter for PostgresUserInserter {
    async fn execute_user_insert(&self, data: PreparedUserData) -> AppResult<User> {
        sqlx::query(INSERT_USER_SQL)
            .bind(&data.id)
            .bind(&data.email)
            .bind(&data.name)
            .bind(&data.password)
            .bind(data.timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "create user", ConflictError::UserExists))?;

        Ok(UserInsertProcessor::into_user(data))
    }

    async fn execute_user_batch_insert(&self, data: Vec<PreparedUserData>) -> AppResult<Vec<User>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let mut created = Vec::with_capacity(data.len());
        for item in data {
            sqlx::query(INSERT_USER_SQL)
                .bind(&item.id)
                .bind(&item.email)
                .bind(&item.name)
                .bind(&item.password)
                .bind(item.timestamp)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    map_database_error(
                        e,
                        "create users",
                        ConflictError::Emails(vec![item.email.clone()]),
                    )
                })?;
            created.push(UserInsertProcessor::into_user(item));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(created)
    }
}
