use email_address::EmailAddress;
use serde_json::{Map, Value};

use crate::error::FieldErrors;
use crate::models::{NewUser, UserChanges};

/// Minimum credential length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub type ValidationResult<T> = Result<T, FieldErrors>;

/// Validates email well-formedness (RFC 5322) ignoring surrounding whitespace.
pub fn validate_email(email: &str) -> bool {
    EmailAddress::is_valid(email.trim())
}

/// Shared password policy for creation and password updates
pub fn validate_password(password: Option<&str>) -> ValidationResult<()> {
    let mut errors = FieldErrors::new();
    match password {
        None | Some("") => errors.push("password", "Password is required"),
        Some(p) if p.chars().count() < MIN_PASSWORD_LENGTH => errors.push(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ),
        Some(_) => {}
    }
    errors.into_result()
}

/// Validates a creation payload, collecting every violation.
pub fn validate_for_create(input: &Value) -> ValidationResult<NewUser> {
    let obj = as_object(input)?;
    let mut errors = FieldErrors::new();

    let email = required_string(obj, "email", &mut errors);
    if let Some(email) = email {
        check_email(email, &mut errors);
    }

    let name = required_string(obj, "name", &mut errors);
    if let Some(name) = name {
        check_name(name, &mut errors);
    }

    let password = optional_string(obj, "password", &mut errors);
    // a wrong type was already reported, don't also call it missing
    if !errors.contains_field("password") {
        if let Err(password_errors) = validate_password(password) {
            for e in password_errors.iter() {
                errors.push(&e.field, e.message.clone());
            }
        }
    }

    errors.into_result()?;

    match (email, name, password) {
        (Some(email), Some(name), Some(password)) => Ok(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }),
        _ => {
            let mut errors = FieldErrors::new();
            errors.push("body", "Incomplete user data");
            Err(errors)
        }
    }
}

/// Validates a partial update. Fields that are absent or `null` are skipped;
/// present ones must satisfy the creation rule for that field.
pub fn validate_for_update(input: &Value) -> ValidationResult<UserChanges> {
    let obj = as_object(input)?;
    let mut errors = FieldErrors::new();

    let email = optional_string(obj, "email", &mut errors);
    if let Some(email) = email {
        check_email(email, &mut errors);
    }

    let name = optional_string(obj, "name", &mut errors);
    if let Some(name) = name {
        check_name(name, &mut errors);
    }

    errors.into_result()?;

    Ok(UserChanges {
        email: email.map(str::to_string),
        name: name.map(str::to_string),
    })
}

/// Fields the update operation knows how to apply
pub fn has_update_fields(input: &Value) -> bool {
    match input {
        Value::Object(obj) => ["email", "name"]
            .iter()
            .any(|key| obj.get(*key).is_some_and(|v| !v.is_null())),
        _ => false,
    }
}

fn as_object(input: &Value) -> ValidationResult<&Map<String, Value>> {
    match input {
        Value::Object(obj) => Ok(obj),
        _ => {
            let mut errors = FieldErrors::new();
            errors.push("body", "User data must be a JSON object");
            Err(errors)
        }
    }
}

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, format!("{} is required", capitalize(field)));
            None
        }
        Some(_) => optional_string(obj, field, errors),
    }
}

fn optional_string<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.push(field, format!("{} must be a string", capitalize(field)));
            None
        }
    }
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.trim().is_empty() {
        errors.push("email", "Email is required");
    } else if !validate_email(email) {
        errors.push("email", "Invalid email format");
    }
}

fn check_name(name: &str, errors: &mut FieldErrors) {
    if name.trim().is_empty() {
        errors.push("name", "Name is required");
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
