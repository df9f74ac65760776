//! Authenticated-user extractors.
//!
//! The access token is taken from the `Authorization: Bearer` header first
//! and from the access cookie as a fallback, so both API clients and
//! browsers authenticate the same way.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use ritmo_core::error::{AppError, ErrorKind};
use ritmo_entity::user::User;

use crate::cookies::ACCESS_COOKIE;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| {
                ApiError(AppError::new(ErrorKind::TokenMissing, "Missing access token"))
            })?;

        let user = state.session_manager.authenticate_access(&token).await?;
        Ok(AuthUser(user))
    }
}

/// Authenticated user holding a privileged role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl std::ops::Deref for AdminUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_privileged() {
            return Err(ApiError(AppError::forbidden(
                "This action requires administrator privileges",
            )));
        }

        Ok(AdminUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

fn cookie_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
