use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use super::super::config::DatabaseBackendConfig;
use super::{SqliteUserDeleter, SqliteUserInserter, SqliteUserReader, SqliteUserUpdater};
use crate::backend::database::{
    UnifiedUserDeleteOps, UnifiedUserInsertOps, UnifiedUserReadOps, UnifiedUserUpdateOps,
};
use crate::backend::{
    Backend, PreparedPasswordUpdate, PreparedUserData, PreparedUserUpdateData, UserBackend,
};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserSummary};

/// SQLite user store
pub struct SqliteBackend {
    pool: SqlitePool,
    user_insert_ops: UnifiedUserInsertOps<SqliteUserInserter>,
    user_update_ops: UnifiedUserUpdateOps<SqliteUserUpdater>,
    user_delete_ops: UnifiedUserDeleteOps<SqliteUserDeleter>,
    user_read_ops: UnifiedUserReadOps<SqliteUserReader>,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_insert_ops: UnifiedUserInsertOps::new(SqliteUserInserter::new(pool.clone())),
            user_update_ops: UnifiedUserUpdateOps::new(SqliteUserUpdater::new(pool.clone())),
            user_delete_ops: UnifiedUserDeleteOps::new(SqliteUserDeleter::new(pool.clone())),
            user_read_ops: UnifiedUserReadOps::new(SqliteUserReader::new(pool.clone())),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        let options = SqliteConnectOptions::from_str(&config.connection_url)
            .map_err(|e| AppError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true);

        // an in-memory database exists only inside its connection, so keep
        // exactly one and never let the pool recycle it
        let pool_options = if config.is_memory_database() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self::new(pool))
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;

        Ok(())
    }

    async fn init_schema(&self) -> AppResult<()> {
        super::schema::init_schema(&self.pool).await
    }
}

#[async_trait]
impl UserBackend for SqliteBackend {
    async fn create_user(&self, data: PreparedUserData) -> AppResult<User> {
        self.user_insert_ops.create_user(data).await
    }

    async fn create_users(&self, data: Vec<PreparedUserData>) -> AppResult<Vec<User>> {
        self.user_insert_ops.create_users(data).await
    }

    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        self.user_read_ops.find_user_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.user_read_ops.find_user_by_email(email).await
    }

    async fn list_user_summaries(&self) -> AppResult<Vec<UserSummary>> {
        self.user_read_ops.list_user_summaries().await
    }

    async fn count_users(&self) -> AppResult<i64> {
        self.user_read_ops.count_users().await
    }

    async fn update_user(&self, data: PreparedUserUpdateData) -> AppResult<Option<User>> {
        self.user_update_ops.update_user(data).await
    }

    async fn update_user_password(
        &self,
        data: PreparedPasswordUpdate,
    ) -> AppResult<Option<User>> {
        self.user_update_ops.update_user_password(data).await
    }

    async fn delete_user(&self, id: &str) -> AppResult<bool> {
        self.user_delete_ops.delete_user(id).await
    }
}
