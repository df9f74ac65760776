//! User administration handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiResult;
use crate::extractors::AdminUser;
use crate::state::AppState;

/// GET /api/auth/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state.user_repo.find_all().await?;
    let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(users)))
}
