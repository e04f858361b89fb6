use crate::vitrine::{
    auth::{session::require_session, AuthConfig, AuthState},
    handlers::GalleryState,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{delete, get, post},
    Extension, Router,
};
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, services::ServeDir, set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod auth;
pub mod files;
pub mod handlers;
mod openapi;
pub mod render;

pub use openapi::openapi;

/// Build the application router.
///
/// Browsing routes sit behind [`require_session`]; login, logout, health,
/// the `OpenAPI` document and the static assets do not.
pub fn router(
    auth_state: Arc<AuthState>,
    gallery_state: Arc<GalleryState>,
    assets_dir: &Path,
) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::folders))
        .route("/gallery", get(handlers::gallery_root))
        .route("/gallery/*folder_path", get(handlers::gallery))
        .route("/view/*file_path", get(handlers::view_file))
        .route("/files/*file_path", delete(handlers::delete_file))
        .route_layer(middleware::from_fn(require_session));

    Router::new()
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/token", post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(openapi::openapi_json))
        .nest_service("/static", ServeDir::new(assets_dir))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state))
                .layer(Extension(gallery_state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    auth_config: AuthConfig,
    gallery_state: GalleryState,
    assets_dir: &Path,
) -> Result<()> {
    let auth_state = Arc::new(AuthState::new(auth_config));
    let app = router(auth_state, Arc::new(gallery_state), assets_dir);

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
