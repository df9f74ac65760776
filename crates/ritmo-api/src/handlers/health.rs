//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = state.db.health_check().await.unwrap_or(false);

    let (status, response) = if db_ok {
        (
            StatusCode::OK,
            HealthResponse {
                status: "ok".to_string(),
                database: "up".to_string(),
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "degraded".to_string(),
                database: "down".to_string(),
            },
        )
    };

    (status, Json(response))
}
