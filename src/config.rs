use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::database::DatabaseBackendConfig;
use crate::backend::DatabaseType;
use crate::error::{AppError, AppResult};
use crate::password::PasswordStorage;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: String,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PasswordConfig {
    #[serde(default)]
    pub storage: PasswordStorage,
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, String> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(format!("Configuration file not found: {}", path.display()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let expanded_content = Self::expand_env_vars(&content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded_content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        Ok(app_config)
    }

    /// In-memory SQLite, credentials stored as supplied, 127.0.0.1:3000
    pub fn default_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                db_type: "sqlite".to_string(),
                url: ":memory:".to_string(),
                max_connections: 1,
                connection_timeout: default_connection_timeout(),
            },
            password: PasswordConfig::default(),
        }
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> Result<String, String> {
        let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .map_err(|e| format!("Invalid expansion pattern: {}", e))?;

        let mut missing = Vec::new();
        let expanded = pattern.replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match (std::env::var(name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        });

        if let Some(name) = missing.first() {
            return Err(format!(
                "Environment variable {} not found and no default provided",
                name
            ));
        }

        Ok(expanded.into_owned())
    }

    /// Translate the `database` section into a backend configuration
    pub fn database_backend_config(&self) -> AppResult<DatabaseBackendConfig> {
        let database_type = match self.database.db_type.as_str() {
            "postgresql" | "postgres" => DatabaseType::PostgreSQL,
            "sqlite" => DatabaseType::SQLite,
            other => {
                return Err(AppError::Configuration(format!(
                    "Unsupported database type: {}",
                    other
                )))
            }
        };

        let config = DatabaseBackendConfig::new(database_type, self.database.url.clone())
            .with_max_connections(self.database.max_connections)
            .with_connection_timeout(self.database.connection_timeout);

        config.validate().map_err(AppError::Configuration)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("USER_SERVICE_TEST_PORT", "8080");

        let yaml_content = "port: ${USER_SERVICE_TEST_PORT:-3000}\nhost: \"${USER_SERVICE_MISSING:-localhost}\"";

        let expanded = AppConfig::expand_env_vars(yaml_content).unwrap();
        assert_eq!(expanded, "port: 8080\nhost: \"localhost\"");

        let result = AppConfig::expand_env_vars("url: ${USER_SERVICE_NOT_SET_ANYWHERE}");
        assert!(result.unwrap_err().contains("USER_SERVICE_NOT_SET_ANYWHERE"));

        std::env::remove_var("USER_SERVICE_TEST_PORT");
    }

    #[test]
    fn test_expansion_leaves_plain_text_alone() {
        let content = "price: $5\nurl: \"sqlite:users.db\"";
        assert_eq!(AppConfig::expand_env_vars(content).unwrap(), content);
    }

    #[test]
    fn test_config_file_loading() {
        let config_content = r#"
server:
  host: "0.0.0.0"
  port: 8080

database:
  type: "postgresql"
  url: "${USER_SERVICE_DB_URL:-postgres://localhost/users}"
  max_connections: 5

password:
  storage: bcrypt
"#;

        let temp_file = std::env::temp_dir().join("user_service_test_config.yaml");
        std::fs::write(&temp_file, config_content).unwrap();

        let config = AppConfig::load_from_file(&temp_file).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.db_type, "postgresql");
        assert_eq!(config.database.url, "postgres://localhost/users");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.connection_timeout, 30);
        assert_eq!(config.password.storage, PasswordStorage::Bcrypt);

        let backend_config = config.database_backend_config().unwrap();
        assert_eq!(backend_config.database_type, DatabaseType::PostgreSQL);
        assert_eq!(backend_config.max_connections, 5);

        std::fs::remove_file(&temp_file).unwrap();
    }

    #[test]
    fn test_password_section_is_optional() {
        let config: AppConfig = serde_yaml::from_str(
            "server: { host: 127.0.0.1, port: 3000 }\ndatabase: { type: sqlite, url: 'sqlite:users.db' }",
        )
        .unwrap();

        assert_eq!(config.password.storage, PasswordStorage::Plain);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file("/nonexistent/path/config.yaml");
        assert!(result.unwrap_err().contains("Configuration file not found"));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default_config();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.db_type, "sqlite");
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.password.storage, PasswordStorage::Plain);

        let backend_config = config.database_backend_config().unwrap();
        assert!(backend_config.is_memory_database());
    }

    #[test]
    fn test_unsupported_database_type() {
        let mut config = AppConfig::default_config();
        config.database.db_type = "mysql".to_string();

        let err = config.database_backend_config().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_file = std::env::temp_dir().join("user_service_invalid_config.yaml");
        std::fs::write(&temp_file, "invalid: yaml: content: [").unwrap();

        let result = AppConfig::load_from_file(&temp_file);
        assert!(result.unwrap_err().contains("Failed to parse config file"));

        std::fs::remove_file(&temp_file).unwrap();
    }
}
