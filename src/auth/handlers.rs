use crate::error::{AppError, Result};
use crate::services::token_service::LoginRequest;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct AuthInput {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResult {
    pub result: String,
    pub token: String,
}

/// POST /auth
#[instrument(skip_all)]
pub async fn auth_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AuthInput>, JsonRejection>,
) -> Result<Json<AuthResult>> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let token = state
        .token_service
        .issue(LoginRequest {
            login: input.login,
            password: input.password,
        })
        .await?;

    Ok(Json(AuthResult {
        result: "OK".to_string(),
        token,
    }))
}
