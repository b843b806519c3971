#![allow(dead_code)]

use axum::Router;
use serde_json::{json, Value};
use user_service::config::AppConfig;
use user_service::password::PasswordStorage;
use user_service::startup;

/// Default configuration: in-memory SQLite, plain password storage
pub fn create_test_app_config() -> AppConfig {
    AppConfig::default_config()
}

pub fn create_test_app_config_with_storage(storage: PasswordStorage) -> AppConfig {
    let mut config = AppConfig::default_config();
    config.password.storage = storage;
    config
}

/// Full router over a fresh in-memory store
pub async fn setup_test_app(config: AppConfig) -> Result<Router, Box<dyn std::error::Error>> {
    Ok(startup::build_app(&config).await?)
}

pub fn create_test_user_json(email: &str, name: &str) -> Value {
    json!({
        "email": email,
        "name": name,
        "password": "longenough1"
    })
}

pub fn create_bulk_json(users: Vec<Value>) -> Value {
    json!({ "users": users })
}
