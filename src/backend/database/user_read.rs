//! User read operations
//!
//! This module provides common interfaces for user read operations
//! that work across different database backends.

use crate::error::AppResult;
use crate::models::{User, UserSummary};
use async_trait::async_trait;

use super::validate_user_id;

/// Trait for user read operations
#[async_trait]
pub trait UserReader: Send + Sync {
    /// Find a user by ID
    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// Find a user by normalized email
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Project every user to id, email and name
    async fn list_user_summaries(&self) -> AppResult<Vec<UserSummary>>;

    async fn count_users(&self) -> AppResult<i64>;
}

/// Unified user read operations
pub struct UnifiedUserReadOps<T: UserReader> {
    reader: T,
}

impl<T: UserReader> UnifiedUserReadOps<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }

    pub async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        validate_user_id(id)?;
        self.reader.find_user_by_id(id).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        if email.is_empty() {
            return Ok(None);
        }
        self.reader.find_user_by_email(email).await
    }

    pub async fn list_user_summaries(&self) -> AppResult<Vec<UserSummary>> {
        self.reader.list_user_summaries().await
    }

    pub async fn count_users(&self) -> AppResult<i64> {
        self.reader.count_users().await
    }
}
