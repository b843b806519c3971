use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::password::PasswordManager;
use crate::schema::normalize_email;

/// User data ready for insertion: id generated, email normalized and the
/// credential in its stored form
#[derive(Clone)]
pub struct PreparedUserData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Debug for PreparedUserData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedUserData")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// Database-specific adapter for user INSERT operations
#[async_trait]
pub trait UserInserter: Send + Sync {
    /// Execute user insert and return the created user
    async fn execute_user_insert(&self, data: PreparedUserData) -> AppResult<User>;

    /// Insert all users inside one transaction
    async fn execute_user_batch_insert(&self, data: Vec<PreparedUserData>) -> AppResult<Vec<User>>;
}

/// Shared business logic for user INSERT operations
pub struct UserInsertProcessor;

impl UserInsertProcessor {
    /// Prepare a validated user for insertion.
    ///
    /// `email` must be the normalized address the caller already used for its
    /// uniqueness lookup, so the checked key and the stored key are identical.
    pub fn prepare_user_for_insert(
        user: &NewUser,
        email: String,
        passwords: &PasswordManager,
    ) -> AppResult<PreparedUserData> {
        let password = passwords.prepare_for_storage(&user.password)?;

        Ok(PreparedUserData {
            id: Uuid::new_v4().to_string(),
            email,
            name: user.name.clone(),
            password,
            timestamp: Utc::now(),
        })
    }

    /// Refuse rows whose email is not in canonical form
    pub fn check_prepared(data: &PreparedUserData) -> AppResult<()> {
        if data.email.is_empty() || normalize_email(&data.email) != data.email {
            return Err(AppError::Internal(format!(
                "email for user {} is not normalized",
                data.id
            )));
        }
        Ok(())
    }

    /// Build the record a successful insert produced
    pub fn into_user(data: PreparedUserData) -> User {
        User {
            id: data.id,
            email: data.email,
            name: data.name,
            password: data.password,
            created_at: data.timestamp,
            updated_at: data.timestamp,
        }
    }
}

/// Unified user INSERT operations using the adapter pattern
pub struct UnifiedUserInsertOps<T: UserInserter> {
    inserter: T,
}

impl<T: UserInserter> UnifiedUserInsertOps<T> {
    pub fn new(inserter: T) -> Self {
        Self { inserter }
    }

    pub async fn create_user(&self, data: PreparedUserData) -> AppResult<User> {
        UserInsertProcessor::check_prepared(&data)?;
        self.inserter.execute_user_insert(data).await
    }

    pub async fn create_users(&self, data: Vec<PreparedUserData>) -> AppResult<Vec<User>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        for item in &data {
            UserInsertProcessor::check_prepared(item)?;
        }
        self.inserter.execute_user_batch_insert(data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            email: " Jane@Example.com ".to_string(),
            name: "Jane".to_string(),
            password: "longenough1".to_string(),
        }
    }

    #[test]
    fn test_prepare_user_for_insert() {
        let user = new_user();
        let prepared = UserInsertProcessor::prepare_user_for_insert(
            &user,
            normalize_email(&user.email),
            &PasswordManager::default(),
        )
        .unwrap();

        assert_eq!(prepared.email, "jane@example.com");
        assert!(Uuid::parse_str(&prepared.id).is_ok());
        assert_eq!(prepared.password, "longenough1");
        assert!(UserInsertProcessor::check_prepared(&prepared).is_ok());
        assert!(prepared.timestamp > Utc::now() - chrono::Duration::seconds(1));
    }

    #[test]
    fn test_check_prepared_rejects_raw_email() {
        let user = new_user();
        let prepared = UserInsertProcessor::prepare_user_for_insert(
            &user,
            user.email.clone(),
            &PasswordManager::default(),
        )
        .unwrap();

        assert!(UserInsertProcessor::check_prepared(&prepared).is_err());
    }

    #[test]
    fn test_debug_omits_password() {
        let user = new_user();
        let prepared = UserInsertProcessor::prepare_user_for_insert(
            &user,
            normalize_email(&user.email),
            &PasswordManager::default(),
        )
        .unwrap();

        assert!(!format!("{:?}", prepared).contains("longenough1"));
    }

    #[test]
    fn test_into_user_sets_both_timestamps() {
        let user = new_user();
        let prepared = UserInsertProcessor::prepare_user_for_insert(
            &user,
            normalize_email(&user.email),
            &PasswordManager::default(),
        )
        .unwrap();
        let id = prepared.id.clone();

        let created = UserInsertProcessor::into_user(prepared);
        assert_eq!(created.id, id);
        assert_eq!(created.created_at, created.updated_at);
    }
}
