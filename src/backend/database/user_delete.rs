use async_trait::async_trait;

use crate::error::AppResult;

use super::validate_user_id;

/// Database-specific adapter for user DELETE operations
#[async_trait]
pub trait UserDeleter: Send + Sync {
    /// Execute user delete and return whether the user was found and deleted
    async fn execute_user_delete(&self, id: &str) -> AppResult<bool>;
}

/// Unified user DELETE operations using the adapter pattern
pub struct UnifiedUserDeleteOps<T: UserDeleter> {
    deleter: T,
}

impl<T: UserDeleter> UnifiedUserDeleteOps<T> {
    pub fn new(deleter: T) -> Self {
        Self { deleter }
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<bool> {
        validate_user_id(id)?;
        self.deleter.execute_user_delete(id).await
    }
}
