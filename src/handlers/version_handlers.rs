use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResult {
    pub result: String,
    pub version: String,
    pub server_time: i64,
}

/// GET / and GET /version
pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResult> {
    Json(VersionResult {
        result: "OK".to_string(),
        version: state.version.to_string(),
        server_time: chrono::Utc::now().timestamp(),
    })
}
