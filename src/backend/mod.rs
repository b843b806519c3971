use crate::error::AppResult;
use crate::models::{User, UserSummary};
use async_trait::async_trait;
use std::sync::Arc;

pub mod database;

pub use database::user_insert::PreparedUserData;
pub use database::user_update::{PreparedPasswordUpdate, PreparedUserUpdateData};

/// Supported database backend types
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

/// Lifecycle of a storage backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect and initialize the storage backend
    async fn connect(config: &crate::backend::database::DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create tables and indexes if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;
}

/// Durable user storage.
///
/// Emails handed to this trait are already normalized. Implementations must
/// keep a unique index on `email` and report violations of it as
/// [`crate::error::AppError::Conflict`], so the uniqueness invariant holds even
/// when two requests race past the service-level lookup.
#[async_trait]
pub trait UserBackend: Backend {
    /// Insert a single prepared user
    async fn create_user(&self, data: PreparedUserData) -> AppResult<User>;

    /// Insert every prepared user in one transaction: either all rows are
    /// committed or none are
    async fn create_users(&self, data: Vec<PreparedUserData>) -> AppResult<Vec<User>>;

    /// Find a user by ID
    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// Find a user by normalized email
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// All users as summaries; the credential column is never selected
    async fn list_user_summaries(&self) -> AppResult<Vec<UserSummary>>;

    async fn count_users(&self) -> AppResult<i64>;

    /// Apply a partial update, `None` when the user does not exist
    async fn update_user(&self, data: PreparedUserUpdateData) -> AppResult<Option<User>>;

    /// Overwrite the stored credential, `None` when the user does not exist
    async fn update_user_password(&self, data: PreparedPasswordUpdate)
        -> AppResult<Option<User>>;

    /// Delete a user, returning whether a row was removed
    async fn delete_user(&self, id: &str) -> AppResult<bool>;
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration
    pub async fn create(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Arc<dyn UserBackend>> {
        let backend = Self::create_backend(config).await?;
        Ok(Arc::from(backend))
    }

    /// Create a backend based on configuration (returns Box)
    pub async fn create_backend(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Box<dyn UserBackend>> {
        match config.database_type {
            DatabaseType::PostgreSQL => {
                let backend =
                    crate::backend::database::postgres::PostgresBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
            DatabaseType::SQLite => {
                let backend =
                    crate::backend::database::sqlite::SqliteBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
        }
    }
}
