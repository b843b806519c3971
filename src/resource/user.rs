use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::AppState;
use crate::backend::Backend;
use crate::error::AppError;
use crate::extractors::ApiJson;

type HandlerResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn respond<T: serde::Serialize>(status: StatusCode, body: &T) -> HandlerResult {
    serde_json::to_value(body)
        .map(|value| (status, Json(value)))
        .map_err(|e| AppError::from(e).to_response())
}

pub async fn create_user(
    State(service): State<AppState>,
    ApiJson(payload): ApiJson<Value>,
) -> HandlerResult {
    match service.create(&payload).await {
        Ok(user) => respond(StatusCode::CREATED, &user),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn create_users(
    State(service): State<AppState>,
    ApiJson(payload): ApiJson<Value>,
) -> HandlerResult {
    match service.create_many(payload.get("users")).await {
        Ok(users) => respond(StatusCode::CREATED, &users),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn list_users(State(service): State<AppState>) -> HandlerResult {
    match service.list().await {
        Ok(users) => respond(StatusCode::OK, &users),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn count_users(State(service): State<AppState>) -> HandlerResult {
    match service.count().await {
        Ok(count) => Ok((StatusCode::OK, Json(json!({ "count": count })))),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn search_users(
    State(service): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let email = params
        .get("email")
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("Email query parameter is required".to_string()).to_response()
        })?;

    match service.find_by_email(email).await {
        Ok(user) => respond(StatusCode::OK, &user),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn get_user(State(service): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    match service.get_public(&id).await {
        Ok(user) => respond(StatusCode::OK, &user),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn update_user(
    State(service): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> HandlerResult {
    match service.update(&id, &payload).await {
        Ok(user) => respond(StatusCode::OK, &user),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn update_password(
    State(service): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> HandlerResult {
    let password = payload.get("password").and_then(Value::as_str);

    match service.update_password(&id, password).await {
        Ok(user) => respond(StatusCode::OK, &user),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn delete_user(State(service): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    match service.delete(&id).await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({ "message": "user deleted successfully" })),
        )),
        Err(e) => Err(e.to_response()),
    }
}

pub async fn health(State(service): State<AppState>) -> HandlerResult {
    match service.backend().health_check().await {
        Ok(()) => Ok((StatusCode::OK, Json(json!({ "status": "ok" })))),
        Err(e) => Err(e.to_response()),
    }
}
