use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::backend::{Backend, BackendFactory, UserBackend};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::logging::logging_middleware;
use crate::password::PasswordManager;
use crate::resource::{user, AppState};
use crate::service::UserService;

/// Connect the configured store and make sure its schema exists
pub async fn setup_backend(config: &AppConfig) -> AppResult<Arc<dyn UserBackend>> {
    let backend_config = config.database_backend_config()?;

    info!(
        "Setting up {} backend ({} connections max)",
        config.database.db_type, backend_config.max_connections
    );
    let backend = BackendFactory::create(&backend_config).await?;
    backend.init_schema().await?;

    Ok(backend)
}

/// Build the user service over `backend` with the configured password storage
pub fn build_service(config: &AppConfig, backend: Arc<dyn UserBackend>) -> AppResult<UserService> {
    let passwords = PasswordManager::new(config.password.storage)?;
    info!("Password storage: {}", passwords.storage());

    Ok(UserService::with_password_manager(backend, passwords))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(user::health))
        .route("/users", post(user::create_user).get(user::list_users))
        .route("/users/count", get(user::count_users))
        .route("/users/search", get(user::search_users))
        .route("/users/bulk", post(user::create_users))
        .route(
            "/users/{id}",
            get(user::get_user)
                .patch(user::update_user)
                .delete(user::delete_user),
        )
        .route("/users/{id}/password", patch(user::update_password))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Backend, service and router from one configuration
pub async fn build_app(config: &AppConfig) -> AppResult<Router> {
    let backend = setup_backend(config).await?;
    let service = build_service(config, backend)?;
    Ok(build_router(Arc::new(service)))
}
