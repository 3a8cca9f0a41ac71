use crate::{error::AppError, AppState};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| AppError::Unauthorized("missing or malformed jwt".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("missing or malformed jwt".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("missing or malformed jwt".to_string()))
}

/// Rejects requests without a valid bearer token; on success the decoded
/// claims are available to handlers through request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers)?;

    let claims = state.token_service.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        AppError::Unauthorized("invalid or expired jwt".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
