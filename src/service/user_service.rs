use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::database::user_insert::UserInsertProcessor;
use crate::backend::database::user_update::UserUpdateProcessor;
use crate::backend::UserBackend;
use crate::error::{AppError, AppResult, ConflictError, ValidationError};
use crate::models::{PublicUser, User, UserChanges, UserSummary};
use crate::password::PasswordManager;
use crate::schema::{
    has_update_fields, normalize_email, validate_for_create, validate_for_update,
    validate_password,
};

/// User operations over an injected store.
///
/// Every check runs before the first mutating store call, so a rejected
/// request leaves the store untouched.
pub struct UserService {
    pub(super) backend: Arc<dyn UserBackend>,
    pub(super) passwords: PasswordManager,
}

impl UserService {
    /// Service storing credentials as supplied
    pub fn new(backend: Arc<dyn UserBackend>) -> Self {
        Self::with_password_manager(backend, PasswordManager::default())
    }

    pub fn with_password_manager(backend: Arc<dyn UserBackend>, passwords: PasswordManager) -> Self {
        Self { backend, passwords }
    }

    pub fn backend(&self) -> &Arc<dyn UserBackend> {
        &self.backend
    }

    pub async fn create(&self, input: &Value) -> AppResult<PublicUser> {
        let user = validate_for_create(input).map_err(|errors| {
            warn!("Rejected user creation: {}", errors);
            AppError::from(errors)
        })?;

        let email = normalize_email(&user.email);
        debug!("Looking up existing user for {}", email);
        if self.backend.find_user_by_email(&email).await?.is_some() {
            warn!("Rejected user creation: {} is already registered", email);
            return Err(ConflictError::UserExists.into());
        }

        let prepared = UserInsertProcessor::prepare_user_for_insert(&user, email, &self.passwords)?;
        let created = self.backend.create_user(prepared).await?;

        info!("Created user {} ({})", created.id, created.email);
        Ok(created.into_public())
    }

    /// Full record including the stored credential, for internal callers
    pub async fn get(&self, id: &str) -> AppResult<User> {
        self.backend
            .find_user_by_id(id)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    pub async fn get_public(&self, id: &str) -> AppResult<PublicUser> {
        Ok(self.get(id).await?.into_public())
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<PublicUser> {
        let email = normalize_email(email);
        debug!("Looking up user by email {}", email);

        self.backend
            .find_user_by_email(&email)
            .await?
            .map(User::into_public)
            .ok_or_else(AppError::user_not_found)
    }

    pub async fn list(&self) -> AppResult<Vec<UserSummary>> {
        self.backend.list_user_summaries().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.backend.count_users().await
    }

    /// Apply a partial update.
    ///
    /// An input without any recognized field is rejected before the record is
    /// looked up, so the outcome does not depend on whether `id` exists.
    pub async fn update(&self, id: &str, input: &Value) -> AppResult<PublicUser> {
        if !has_update_fields(input) {
            warn!("Rejected update of user {}: no fields supplied", id);
            return Err(ValidationError::NoFields.into());
        }

        let existing = self.get(id).await?;

        let changes = validate_for_update(input).map_err(|errors| {
            warn!("Rejected update of user {}: {}", id, errors);
            AppError::from(errors)
        })?;

        let email = match changes.email {
            Some(ref raw) => {
                let email = normalize_email(raw);
                debug!("Checking ownership of {}", email);
                if let Some(owner) = self.backend.find_user_by_email(&email).await? {
                    if owner.id != existing.id {
                        warn!("Rejected update of user {}: {} is in use", id, email);
                        return Err(ConflictError::EmailInUse.into());
                    }
                }
                Some(email)
            }
            None => None,
        };

        let changes = UserChanges {
            email,
            name: changes.name,
        };
        let prepared = UserUpdateProcessor::prepare_user_for_update(&existing.id, &changes)?;

        let updated = self
            .backend
            .update_user(prepared)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        info!("Updated user {}", updated.id);
        Ok(updated.into_public())
    }

    pub async fn update_password(&self, id: &str, password: Option<&str>) -> AppResult<PublicUser> {
        let existing = self.get(id).await?;

        validate_password(password).map_err(|errors| {
            warn!("Rejected password update of user {}: {}", id, errors);
            AppError::from(errors)
        })?;
        let password = password.unwrap_or_default();

        let prepared =
            UserUpdateProcessor::prepare_password_update(&existing.id, password, &self.passwords)?;

        let updated = self
            .backend
            .update_user_password(prepared)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        info!("Updated password of user {}", updated.id);
        Ok(updated.into_public())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let existing = self.get(id).await?;

        // a concurrent delete between the lookup and here also ends as not found
        if !self.backend.delete_user(&existing.id).await? {
            return Err(AppError::user_not_found());
        }

        info!("Deleted user {}", existing.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::database::{DatabaseBackendConfig, SqliteBackend};
    use crate::backend::Backend;
    use crate::password::PasswordStorage;
    use serde_json::json;

    async fn memory_service() -> UserService {
        let backend = SqliteBackend::connect(&DatabaseBackendConfig::memory_sqlite())
            .await
            .unwrap();
        backend.init_schema().await.unwrap();
        UserService::new(Arc::new(backend))
    }

    fn jane() -> Value {
        json!({
            "email": "jane@example.com",
            "name": "Jane",
            "password": "longenough1"
        })
    }

    #[tokio::test]
    async fn test_create_returns_public_view() {
        let service = memory_service().await;

        let created = service.create(&jane()).await.unwrap();
        assert_eq!(created.email, "jane@example.com");

        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_stores_normalized_email() {
        let service = memory_service().await;

        let created = service
            .create(&json!({
                "email": "  Jane@Example.COM ",
                "name": "Jane",
                "password": "longenough1"
            }))
            .await
            .unwrap();

        assert_eq!(created.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_create_conflicts_on_normalized_duplicate() {
        let service = memory_service().await;
        service.create(&jane()).await.unwrap();

        let err = service
            .create(&json!({
                "email": " JANE@example.com",
                "name": "Other Jane",
                "password": "longenough2"
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(ConflictError::UserExists)));
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_short_password_never_reaches_store() {
        let service = memory_service().await;

        let err = service
            .create(&json!({"email": " A@B.com ", "name": "A", "password": "short"}))
            .await
            .unwrap_err();

        match err {
            AppError::Validation(ValidationError::Fields(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.contains_field("password"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_hashed_storage() {
        let backend = SqliteBackend::connect(&DatabaseBackendConfig::memory_sqlite())
            .await
            .unwrap();
        backend.init_schema().await.unwrap();
        let passwords = PasswordManager::new(PasswordStorage::Bcrypt).unwrap();
        let service = UserService::with_password_manager(Arc::new(backend), passwords);

        let created = service.create(&jane()).await.unwrap();
        let stored = service.get(&created.id).await.unwrap();

        assert_ne!(stored.password, "longenough1");
        assert!(PasswordManager::default()
            .verify_password("longenough1", &stored.password)
            .unwrap());
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let service = memory_service().await;

        let err = service.get("does-not-exist").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.get_public("  ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_get_returns_credential_for_internal_callers() {
        let service = memory_service().await;
        let created = service.create(&jane()).await.unwrap();

        let user = service.get(&created.id).await.unwrap();
        assert_eq!(user.password, "longenough1");
        assert_eq!(service.get_public(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_find_by_email_normalizes_query() {
        let service = memory_service().await;
        let created = service.create(&jane()).await.unwrap();

        let found = service.find_by_email(" JANE@EXAMPLE.com ").await.unwrap();
        assert_eq!(found.id, created.id);

        let err = service.find_by_email("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_returns_summaries_in_creation_order() {
        let service = memory_service().await;
        let first = service.create(&jane()).await.unwrap();
        let second = service
            .create(&json!({"email": "john@example.com", "name": "John", "password": "longenough1"}))
            .await
            .unwrap();

        let users = service.list().await.unwrap();
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    }

    #[tokio::test]
    async fn test_update_without_fields_is_validation_error_for_any_id() {
        let service = memory_service().await;
        let created = service.create(&jane()).await.unwrap();

        for id in [created.id.as_str(), "missing-id"] {
            let err = service.update(id, &json!({})).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(ValidationError::NoFields)));
        }

        let err = service
            .update(&created.id, &json!({"password": "longenough2"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::NoFields)));
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let service = memory_service().await;

        let err = service
            .update("missing-id", &json!({"name": "Nobody"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_own_email_never_conflicts() {
        let service = memory_service().await;
        let created = service.create(&jane()).await.unwrap();

        let updated = service
            .update(&created.id, &json!({"email": " Jane@EXAMPLE.com"}))
            .await
            .unwrap();

        assert_eq!(updated.email, "jane@example.com");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_to_other_users_email_conflicts() {
        let service = memory_service().await;
        let jane = service.create(&jane()).await.unwrap();
        service
            .create(&json!({"email": "john@example.com", "name": "John", "password": "longenough1"}))
            .await
            .unwrap();

        let err = service
            .update(&jane.id, &json!({"email": "JOHN@example.com", "name": "Jane Doe"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ConflictError::EmailInUse)));

        let unchanged = service.get_public(&jane.id).await.unwrap();
        assert_eq!(unchanged.name, "Jane");
        assert_eq!(unchanged.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_update_validates_present_fields() {
        let service = memory_service().await;
        let created = service.create(&jane()).await.unwrap();

        let err = service
            .update(&created.id, &json!({"email": "not-an-email"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::Fields(_))));
    }

    #[tokio::test]
    async fn test_update_password() {
        let service = memory_service().await;
        let created = service.create(&jane()).await.unwrap();

        let err = service
            .update_password(&created.id, Some("short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::Fields(_))));

        let err = service.update_password(&created.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::Fields(_))));

        let updated = service
            .update_password(&created.id, Some("brand-new-password"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(
            service.get(&created.id).await.unwrap().password,
            "brand-new-password"
        );
    }

    #[tokio::test]
    async fn test_update_password_unknown_user_is_not_found_first() {
        let service = memory_service().await;

        let err = service
            .update_password("missing-id", Some("short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let service = memory_service().await;
        let created = service.create(&jane()).await.unwrap();

        service.delete(&created.id).await.unwrap();
        let err = service.delete(&created.id).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(service.count().await.unwrap(), 0);
    }
}
