use crate::error::{AppError, Result};
use crate::models::user::{User, UserFilter};
use crate::services::user_service::{CreateUserRequest, UpdateUserRequest};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

/// Payload for POST /users and PUT /users/{id}
#[derive(Debug, Default, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
}

/// Ids are positive integers; anything else is a malformed request.
fn parse_id(id: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if id <= 0 {
        return Err(AppError::BadRequest(format!("invalid user id: {}", id)));
    }
    Ok(id)
}

fn parse_body(payload: std::result::Result<Json<UserInput>, JsonRejection>) -> Result<UserInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// GET /users
#[instrument(skip(state))]
pub async fn list_users_handler(
    State(state): State<AppState>,
    filter: std::result::Result<Query<UserFilter>, QueryRejection>,
) -> Result<Json<Vec<User>>> {
    let Query(filter) = filter.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let users = state.user_service.list_users(filter).await?;
    Ok(Json(users))
}

/// GET /users/{id}
#[instrument(skip(state))]
pub async fn get_user_handler(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<User>> {
    let id = parse_id(id)?;
    let user = state.user_service.find_user_by_id(id).await?;
    Ok(Json(user))
}

/// POST /users
#[instrument(skip_all)]
pub async fn create_user_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let input = parse_body(payload)?;

    let user = state
        .user_service
        .create_user(CreateUserRequest {
            login: input.login,
            password: input.password,
            email: input.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users/{id}
#[instrument(skip(state, payload))]
pub async fn update_user_handler(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<User>> {
    let id = parse_id(id)?;
    let input = parse_body(payload)?;

    let user = state
        .user_service
        .update_user(UpdateUserRequest {
            user_id: id,
            login: Some(input.login),
            password: Some(input.password),
            email: input.email,
        })
        .await?;

    Ok(Json(user))
}

/// DELETE /users/{id}
#[instrument(skip(state))]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let id = parse_id(id)?;
    state.user_service.delete_user(id).await?;
    Ok(StatusCode::OK)
}
