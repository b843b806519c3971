pub mod normalization;
pub mod validation;

pub use normalization::normalize_email;
pub use validation::{
    has_update_fields, validate_for_create, validate_for_update, validate_password, ValidationResult,
    MIN_PASSWORD_LENGTH,
};
