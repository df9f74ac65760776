//! Auth cookie construction.
//!
//! Both tokens are mirrored into HTTP-only cookies so browser clients need
//! no token handling of their own. Non-browser clients can ignore the
//! cookies and use the response body.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use ritmo_core::config::AuthConfig;

/// Cookie carrying the access token.
pub const ACCESS_COOKIE: &str = "ritmo_access_token";
/// Cookie carrying the refresh token secret.
pub const REFRESH_COOKIE: &str = "ritmo_refresh_token";

/// Build the access token cookie with the access TTL as max-age.
pub fn access_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    build(
        ACCESS_COOKIE,
        token,
        Duration::seconds(config.access_ttl_seconds() as i64),
        config.cookie_secure,
    )
}

/// Build the refresh token cookie with the refresh TTL as max-age.
pub fn refresh_cookie(secret: String, config: &AuthConfig) -> Cookie<'static> {
    build(
        REFRESH_COOKIE,
        secret,
        Duration::seconds(config.refresh_ttl_seconds() as i64),
        config.cookie_secure,
    )
}

/// Build an expired access cookie, clearing it client-side.
pub fn clear_access_cookie(config: &AuthConfig) -> Cookie<'static> {
    build(ACCESS_COOKIE, String::new(), Duration::ZERO, config.cookie_secure)
}

/// Build an expired refresh cookie, clearing it client-side.
pub fn clear_refresh_cookie(config: &AuthConfig) -> Cookie<'static> {
    build(REFRESH_COOKIE, String::new(), Duration::ZERO, config.cookie_secure)
}

fn build(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(max_age)
        .build()
}
