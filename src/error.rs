use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// A single rejected field with a human readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Ordered list of field errors. Validators push every violation they find,
/// so callers see all problems with one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected, the errors otherwise.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", joined.join("; "))
    }
}

/// Field errors of one element of a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub index: usize,
    pub errors: FieldErrors,
}

/// Malformed or incomplete input. The caller can fix and resubmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Fields(FieldErrors),
    NoFields,
    EmptyBatch,
    Batch(Vec<RowError>),
    DuplicateEmails(Vec<String>),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Fields(errors) => write!(f, "validation failed: {}", errors),
            ValidationError::NoFields => write!(f, "Provide at least one field to update"),
            ValidationError::EmptyBatch => write!(f, "Provide an array of users"),
            ValidationError::Batch(rows) => {
                let indices: Vec<String> = rows.iter().map(|r| r.index.to_string()).collect();
                write!(f, "invalid users at indices {}", indices.join(", "))
            }
            ValidationError::DuplicateEmails(emails) => {
                write!(f, "Duplicate emails in the request: {}", emails.join(", "))
            }
        }
    }
}

/// Uniqueness violations on the normalized email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    UserExists,
    EmailInUse,
    Emails(Vec<String>),
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::UserExists => write!(f, "user already exists"),
            ConflictError::EmailInUse => write!(f, "Email already in use"),
            ConflictError::Emails(emails) => {
                write!(f, "Email already exists: {}", emails.join(", "))
            }
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    NotFound(String),
    Conflict(ConflictError),
    BadRequest(String),
    Database(String),
    Serialization(serde_json::Error),
    Internal(String),
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "Validation error: {}", e),
            AppError::NotFound(e) => write!(f, "Not found: {}", e),
            AppError::Conflict(e) => write!(f, "Conflict: {}", e),
            AppError::BadRequest(e) => write!(f, "Bad request: {}", e),
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(ValidationError::Fields(errors))
    }
}

impl From<ConflictError> for AppError {
    fn from(err: ConflictError) -> Self {
        AppError::Conflict(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Internal(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> (StatusCode, Json<serde_json::Value>) {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(ValidationError::Fields(errors)) => json!({
                "message": "validation failed",
                "errors": errors,
            }),
            AppError::Validation(ValidationError::NoFields) => json!({
                "error": "Validation error",
                "fields": { "body": "Provide at least one field to update" },
            }),
            AppError::Validation(ValidationError::EmptyBatch) => json!({
                "error": "Validation error",
                "message": "Provide an array of users",
            }),
            AppError::Validation(ValidationError::Batch(rows)) => json!({
                "error": "Validation error",
                "details": rows,
            }),
            AppError::Validation(ValidationError::DuplicateEmails(emails)) => json!({
                "error": "Validation error",
                "message": "Duplicate emails in the request",
                "duplicates": emails,
            }),
            AppError::NotFound(message) | AppError::BadRequest(message) => {
                json!({ "message": message })
            }
            AppError::Conflict(ConflictError::UserExists) => {
                json!({ "message": "user already exists" })
            }
            AppError::Conflict(ConflictError::EmailInUse) => {
                json!({ "error": "Email already in use" })
            }
            AppError::Conflict(ConflictError::Emails(emails)) => json!({
                "error": "Email already exists",
                "emails": emails,
            }),
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Internal(_)
            | AppError::Configuration(_) => {
                tracing::error!("{}", self);
                json!({ "error": self.to_string() })
            }
        };

        (status, Json(body))
    }
}
