//! Session management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use ritmo_entity::session::SessionView;

use crate::dto::request::SessionLimitRequest;
use crate::dto::response::{ApiResponse, CleanupResponse, RevokedResponse};
use crate::error::ApiResult;
use crate::extractors::{AdminUser, AuthUser};
use crate::state::AppState;

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<SessionView>>>> {
    let sessions = state.session_manager.list_sessions(auth.id).await?;
    Ok(Json(ApiResponse::ok(sessions)))
}

/// DELETE /api/auth/sessions/{id}
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .session_manager
        .revoke_session(auth.id, session_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/sessions/limit
pub async fn set_session_limit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SessionLimitRequest>,
) -> ApiResult<Json<ApiResponse<RevokedResponse>>> {
    let revoked = state
        .session_manager
        .cap_sessions(auth.id, req.max_sessions)
        .await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked })))
}

/// POST /api/auth/cleanup
pub async fn cleanup(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ApiResponse<CleanupResponse>>> {
    let purged = state.session_manager.purge_expired().await?;
    Ok(Json(ApiResponse::ok(CleanupResponse { purged })))
}
