//! Auth handlers: register, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use ritmo_auth::session::{DeviceInfo, IssuedTokens};
use ritmo_core::error::{AppError, ErrorKind};
use ritmo_entity::user::{CreateUser, UserRole};

use crate::cookies;
use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{
    ApiResponse, LoginResponse, MessageResponse, TokenResponse, UserResponse,
};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let password_hash = state.password_hasher.hash_password(&req.password)?;
    let user = state
        .user_repo
        .create(CreateUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            password_hash,
            role: UserRole::User,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(&user))),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<ApiResponse<LoginResponse>>)> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let (user, tokens) = state
        .session_manager
        .login(&req.identifier, &req.password, device_info(&headers))
        .await?;

    let jar = set_auth_cookies(jar, &state, &tokens);
    let response = LoginResponse {
        tokens: token_response(&state, tokens),
        user: UserResponse::from(&user),
    };

    Ok((jar, Json(ApiResponse::ok(response))))
}

/// POST /api/auth/refresh
///
/// The secret is taken from the request body when present, falling back to
/// the refresh cookie.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<ApiResponse<TokenResponse>>)> {
    let secret = body
        .ok()
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| refresh_cookie_value(&jar))
        .ok_or_else(|| {
            AppError::new(ErrorKind::RefreshTokenMissing, "Missing refresh token")
        })?;

    let (_, tokens) = state.session_manager.refresh(&secret).await?;

    let jar = set_auth_cookies(jar, &state, &tokens);
    Ok((jar, Json(ApiResponse::ok(token_response(&state, tokens)))))
}

/// POST /api/auth/logout
///
/// Ends the current session, or every session with `all_devices`. The auth
/// cookies are cleared regardless of how many sessions were revoked.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    body: Result<Json<LogoutRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<ApiResponse<MessageResponse>>)> {
    let all_devices = body.ok().map(|Json(req)| req.all_devices).unwrap_or(false);
    let secret = refresh_cookie_value(&jar);

    state
        .session_manager
        .logout(auth.id, secret.as_deref(), all_devices)
        .await?;

    let jar = jar
        .add(cookies::clear_access_cookie(&state.config.auth))
        .add(cookies::clear_refresh_cookie(&state.config.auth));

    Ok((
        jar,
        Json(ApiResponse::ok(MessageResponse {
            message: "Logged out successfully".to_string(),
        })),
    ))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(UserResponse::from(&auth.0)))
}

fn device_info(headers: &HeaderMap) -> DeviceInfo {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    // First hop of X-Forwarded-For, when a proxy supplies it.
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    DeviceInfo {
        user_agent,
        ip_address,
    }
}

fn refresh_cookie_value(jar: &CookieJar) -> Option<String> {
    jar.get(cookies::REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

fn set_auth_cookies(jar: CookieJar, state: &AppState, tokens: &IssuedTokens) -> CookieJar {
    let auth = &state.config.auth;
    jar.add(cookies::access_cookie(tokens.access_token.clone(), auth))
        .add(cookies::refresh_cookie(tokens.refresh_token.clone(), auth))
}

fn token_response(state: &AppState, tokens: IssuedTokens) -> TokenResponse {
    TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "bearer".to_string(),
        expires_in: state.session_manager.access_ttl_seconds(),
        access_expires_at: tokens.access_expires_at,
        refresh_expires_at: tokens.refresh_expires_at,
    }
}
