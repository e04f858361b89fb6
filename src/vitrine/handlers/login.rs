use super::{GalleryState, HandlerError};
use crate::vitrine::{
    auth::{
        login::authenticate,
        session::{redirect_to_login, session_cookie},
        AuthState, LoginError,
    },
    render::View,
};
use axum::{
    extract::{Extension, Form},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::{path::Path, sync::Arc};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
    /// Directory to browse; blank for the configured default.
    #[serde(default)]
    requested_root: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("requested_root", &self.requested_root)
            .finish_non_exhaustive()
    }
}

fn default_root(auth_state: &AuthState) -> Option<&str> {
    auth_state
        .config()
        .default_root()
        .and_then(|root| root.to_str())
}

fn form_page(
    status: StatusCode,
    auth_state: &AuthState,
    gallery: &GalleryState,
    error: Option<&str>,
) -> Response {
    let html = gallery.renderer().render(&View::Login {
        error,
        default_root: default_root(auth_state),
    });
    (status, Html(html)).into_response()
}

/// Sign a token for the new session and wrap it in a `Set-Cookie` value.
fn issue_session(
    auth_state: &AuthState,
    username: &str,
    root: &Path,
) -> Result<HeaderValue, HandlerError> {
    let token = auth_state
        .codec()
        .issue(username, root)
        .map_err(|err| HandlerError::Internal(format!("Failed to issue session: {err}")))?;
    session_cookie(auth_state.config(), &token)
        .map_err(|err| HandlerError::Internal(format!("Failed to build session cookie: {err}")))
}

// axum handler for the login form
pub async fn login_form(
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(gallery): Extension<Arc<GalleryState>>,
) -> Response {
    form_page(StatusCode::OK, &auth_state, &gallery, None)
}

#[utoipa::path(
    post,
    path= "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 303, description = "Session cookie set, redirect to /"),
        (status = 400, description = "Requested root is not an accessible directory"),
        (status = 401, description = "Invalid username or password"),
    ),
    tag= "auth"
)]
// axum handler for login, also mounted at /token
pub async fn login(
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(gallery): Extension<Arc<GalleryState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let root = match authenticate(
        auth_state.config(),
        &form.username,
        &form.password,
        &form.requested_root,
    ) {
        Ok(root) => root,
        Err(err) => {
            warn!(user = %form.username, "Login rejected: {err}");
            let (status, message) = match err {
                LoginError::BadCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid username or password")
                }
                LoginError::RootNotFound => (StatusCode::BAD_REQUEST, "Folder not accessible"),
            };
            return form_page(status, &auth_state, &gallery, Some(message));
        }
    };

    match issue_session(&auth_state, &form.username, &root) {
        Ok(cookie) => {
            info!(user = %form.username, root = %root.display(), "Login succeeded");
            let mut response = Redirect::to("/").into_response();
            response.headers_mut().insert(SET_COOKIE, cookie);
            response
        }
        Err(err) => err.into_response(),
    }
}

// axum handler for logout
pub async fn logout(Extension(auth_state): Extension<Arc<AuthState>>) -> Response {
    redirect_to_login(auth_state.config(), true)
}
