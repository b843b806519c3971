use futures::future::join_all;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::UserService;
use crate::backend::database::user_insert::UserInsertProcessor;
use crate::error::{AppError, AppResult, ConflictError, RowError, ValidationError};
use crate::models::{NewUser, PublicUser};
use crate::schema::{normalize_email, validate_for_create};

impl UserService {
    /// Create every user in `batch` or none of them.
    ///
    /// The batch goes through validation, an in-batch duplicate check and a
    /// store conflict check, in that order; the first stage that fails
    /// rejects the whole batch. Accepted users are committed in one store
    /// transaction and returned in input order.
    pub async fn create_many(&self, batch: Option<&Value>) -> AppResult<Vec<PublicUser>> {
        let items = match batch {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Err(ValidationError::EmptyBatch.into()),
        };

        let users = validate_batch(items)?;

        let emails: Vec<String> = users.iter().map(|u| normalize_email(&u.email)).collect();
        let duplicates = find_duplicates(&emails);
        if !duplicates.is_empty() {
            warn!("Rejected batch: duplicate emails {:?}", duplicates);
            return Err(ValidationError::DuplicateEmails(duplicates).into());
        }

        let taken = self.find_taken_emails(&emails).await?;
        if !taken.is_empty() {
            warn!("Rejected batch: emails already registered {:?}", taken);
            return Err(ConflictError::Emails(taken).into());
        }

        let prepared = users
            .iter()
            .zip(emails)
            .map(|(user, email)| {
                UserInsertProcessor::prepare_user_for_insert(user, email, &self.passwords)
            })
            .collect::<AppResult<Vec<_>>>()?;

        let created = self.backend.create_users(prepared).await?;

        info!("Created {} users in batch", created.len());
        Ok(created.into_iter().map(|u| u.into_public()).collect())
    }

    /// Look every email up concurrently and wait for all lookups before
    /// deciding. Returns the taken ones in batch order.
    async fn find_taken_emails(&self, emails: &[String]) -> AppResult<Vec<String>> {
        debug!("Checking {} batch emails against the store", emails.len());

        let lookups = emails
            .iter()
            .map(|email| self.backend.find_user_by_email(email));
        let results = join_all(lookups).await;

        let mut taken = Vec::new();
        for (email, result) in emails.iter().zip(results) {
            if result?.is_some() {
                taken.push(email.clone());
            }
        }
        Ok(taken)
    }
}

/// Validate every element, collecting the field errors of each failing index
fn validate_batch(items: &[Value]) -> AppResult<Vec<NewUser>> {
    let mut users = Vec::with_capacity(items.len());
    let mut rows = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match validate_for_create(item) {
            Ok(user) => users.push(user),
            Err(errors) => rows.push(RowError { index, errors }),
        }
    }

    if !rows.is_empty() {
        warn!("Rejected batch: {} invalid users", rows.len());
        return Err(AppError::from(ValidationError::Batch(rows)));
    }
    Ok(users)
}

/// Emails occurring more than once, each listed once in first-seen order
fn find_duplicates(emails: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for email in emails {
        if !seen.insert(email.as_str()) && reported.insert(email.as_str()) {
            duplicates.push(email.clone());
        }
    }
    duplicates
}
