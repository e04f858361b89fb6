//! Session cookie handling and the auth gate for protected routes.

use axum::{
    extract::{Extension, Request},
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    state::{AuthConfig, AuthState},
    token::{AuthError, Session},
};

pub const SESSION_COOKIE_NAME: &str = "access_token";
pub const LOGIN_PATH: &str = "/login";

/// Build the `HttpOnly` cookie carrying a freshly issued token.
///
/// # Errors
/// Returns an error if the token contains bytes not allowed in a header.
pub fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.session_ttl().as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a cookie that removes the session cookie from the browser.
///
/// # Errors
/// Never in practice; the value is a fixed ASCII string.
pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the session token from the `Cookie` header(s).
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME {
                let val = val.trim();
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

/// Resolve the request's session cookie into a [`Session`].
///
/// # Errors
/// `AuthError::Missing` when no cookie is present, otherwise whatever the
/// token codec reports.
pub fn authenticate(headers: &HeaderMap, auth_state: &AuthState) -> Result<Session, AuthError> {
    let token = extract_session_token(headers).ok_or(AuthError::Missing)?;
    auth_state.codec().validate(&token)
}

/// Redirect to the login page, clearing the cookie when it was present but bad.
#[must_use]
pub fn redirect_to_login(config: &AuthConfig, clear_cookie: bool) -> Response {
    let mut response = Redirect::to(LOGIN_PATH).into_response();
    if clear_cookie {
        match clear_session_cookie(config) {
            Ok(cookie) => {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            Err(err) => warn!("Failed to build clear-cookie header: {err}"),
        }
    }
    response
}

/// Auth gate: attach the decoded [`Session`] to the request or redirect to login.
pub async fn require_session(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &auth_state) {
        Ok(session) => {
            debug!(user = %session.username, "session accepted");
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => {
            debug!(path = %request.uri().path(), "redirecting to login: {err}");
            redirect_to_login(auth_state.config(), err != AuthError::Missing)
        }
    }
}
