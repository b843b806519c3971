use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::super::user_read::UserReader;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserSummary};

pub(super) const USER_COLUMNS: &str = "id, email, name, password, created_at, updated_at";

/// SQLite-specific implementation of UserReader
pub struct SqliteUserReader {
    pool: SqlitePool,
}

impl SqliteUserReader {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Decode a full users row
pub(super) fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let decode = |e: sqlx::Error| AppError::Database(format!("Failed to decode user row: {}", e));

    Ok(User {
        id: row.try_get("id").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        password: row.try_get("password").map_err(decode)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    })
}

#[async_trait]
impl UserReader for SqliteUserReader {
    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn list_user_summaries(&self) -> AppResult<Vec<UserSummary>> {
        let rows = sqlx::query("SELECT id, email, name FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(UserSummary {
                    id: row.try_get("id").map_err(|e| {
                        AppError::Database(format!("Failed to decode user summary: {}", e))
                    })?,
                    email: row.try_get("email").map_err(|e| {
                        AppError::Database(format!("Failed to decode user summary: {}", e))
                    })?,
                    name: row.try_get("name").map_err(|e| {
                        AppError::Database(format!("Failed to decode user summary: {}", e))
                    })?,
                })
            })
            .collect()
    }

    async fn count_users(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count users: {}", e)))
    }
}
