use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::super::user_read::UserReader;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserSummary};

pub(super) const USER_COLUMNS: &str = "id, email, name, password, created_at, updated_at";

/// PostgreSQL-specific implementation of UserReader
pub struct PostgresUserReader {
    pool: PgPool,
}

impl PostgresUserReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(super) fn row_to_user(row: &PgRow) -> AppResult<User> {
    let decode = |e: sqlx::Error| AppError::Database(format!("Failed to decode user row: {}", e));

    Ok(User {
        id: row.try_get("id").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        password: row.try_get("password").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}

fn row_to_summary(row: &PgRow) -> AppResult<UserSummary> {
    let decode =
        |e: sqlx::Error| AppError::Database(format!("Failed to decode user summary: {}", e));

    Ok(UserSummary {
        id: row.try_get("id").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
    })
}

#[async_trait]
impl UserReader for PostgresUserReader {
    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

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

        rows.iter().map(row_to_summary).collect()
    }

    async fn count_users(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count users: {}", e)))
    }
}
