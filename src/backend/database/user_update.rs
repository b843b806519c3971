use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{User, UserChanges};
use crate::password::PasswordManager;
use crate::schema::normalize_email;

use super::validate_user_id;

/// Database-specific adapter for user UPDATE operations
#[async_trait]
pub trait UserUpdater: Send + Sync {
    /// Apply the changed columns and return the updated user
    async fn execute_user_update(&self, data: PreparedUserUpdateData) -> AppResult<Option<User>>;

    /// Overwrite the credential column and return the updated user
    async fn execute_password_update(&self, data: PreparedPasswordUpdate)
        -> AppResult<Option<User>>;
}

/// Partial update ready for the database. `None` columns keep their value.
#[derive(Debug, Clone)]
pub struct PreparedUserUpdateData {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PreparedPasswordUpdate {
    pub id: String,
    pub password: String,
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Debug for PreparedPasswordUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedPasswordUpdate")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// Processor for common user update business logic
pub struct UserUpdateProcessor;

impl UserUpdateProcessor {
    /// Prepare validated changes. An email in `changes` must already be
    /// normalized.
    pub fn prepare_user_for_update(
        id: &str,
        changes: &UserChanges,
    ) -> AppResult<PreparedUserUpdateData> {
        validate_user_id(id)?;

        if let Some(ref email) = changes.email {
            if normalize_email(email) != *email {
                return Err(AppError::Internal(format!(
                    "email update for user {} is not normalized",
                    id
                )));
            }
        }

        Ok(PreparedUserUpdateData {
            id: id.to_string(),
            email: changes.email.clone(),
            name: changes.name.clone(),
            timestamp: Utc::now(),
        })
    }

    pub fn prepare_password_update(
        id: &str,
        password: &str,
        passwords: &PasswordManager,
    ) -> AppResult<PreparedPasswordUpdate> {
        validate_user_id(id)?;

        Ok(PreparedPasswordUpdate {
            id: id.to_string(),
            password: passwords.prepare_for_storage(password)?,
            timestamp: Utc::now(),
        })
    }
}

/// Unified user update operations handler
pub struct UnifiedUserUpdateOps<T: UserUpdater> {
    updater: T,
}

impl<T: UserUpdater> UnifiedUserUpdateOps<T> {
    pub fn new(updater: T) -> Self {
        Self { updater }
    }

    pub async fn update_user(&self, data: PreparedUserUpdateData) -> AppResult<Option<User>> {
        validate_user_id(&data.id)?;
        self.updater.execute_user_update(data).await
    }

    pub async fn update_user_password(
        &self,
        data: PreparedPasswordUpdate,
    ) -> AppResult<Option<User>> {
        validate_user_id(&data.id)?;
        self.updater.execute_password_update(data).await
    }
}
