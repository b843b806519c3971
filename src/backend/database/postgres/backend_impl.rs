use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::super::config::DatabaseBackendConfig;
use super::{PostgresUserDeleter, PostgresUserInserter, PostgresUserReader, PostgresUserUpdater};
use crate::backend::database::{
    UnifiedUserDeleteOps, UnifiedUserInsertOps, UnifiedUserReadOps, UnifiedUserUpdateOps,
};
use crate::backend::{
    Backend, PreparedPasswordUpdate, PreparedUserData, PreparedUserUpdateData, UserBackend,
};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserSummary};

/// PostgreSQL user store
pub struct PostgresBackend {
    pool: PgPool,
    user_insert_ops: UnifiedUserInsertOps<PostgresUserInserter>,
    user_update_ops: UnifiedUserUpdateOps<PostgresUserUpdater>,
    user_delete_ops: UnifiedUserDeleteOps<PostgresUserDeleter>,
    user_read_ops: UnifiedUserReadOps<PostgresUserReader>,
}

impl PostgresBackend {
    /// Create a new PostgreSQL backend instance
    pub fn new(pool: PgPool) -> Self {
        let user_inserter = PostgresUserInserter::new(pool.clone());
        let user_updater = PostgresUserUpdater::new(pool.clone());
        let user_deleter = PostgresUserDeleter::new(pool.clone());
        let user_reader = PostgresUserReader::new(pool.clone());

        Self {
            pool,
            user_insert_ops: UnifiedUserInsertOps::new(user_inserter),
            user_update_ops: UnifiedUserUpdateOps::new(user_updater),
            user_delete_ops: UnifiedUserDeleteOps::new(user_deleter),
            user_read_ops: UnifiedUserReadOps::new(user_reader),
        }
    }

    /// Get the connection pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.connection_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

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
impl UserBackend for PostgresBackend {
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
