pub mod user;

use std::sync::Arc;

use crate::service::UserService;

/// Shared handler state
pub type AppState = Arc<UserService>;
