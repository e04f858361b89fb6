pub mod delete;
pub use self::delete::delete_file;

pub mod folders;
pub use self::folders::folders;

pub mod gallery;
pub use self::gallery::{gallery, gallery_root};

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::{login, login_form, logout};

pub mod view;
pub use self::view::view_file;

// common types for the handlers
use crate::vitrine::{
    files::{ExtensionCase, ListError, PathError},
    render::{MaudRenderer, Renderer},
};
use axum::{
    extract::{rejection::PathRejection, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Browsing settings shared by the gallery handlers.
#[derive(Clone)]
pub struct GalleryState {
    renderer: Arc<dyn Renderer>,
    extension_case: ExtensionCase,
}

impl GalleryState {
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>, extension_case: ExtensionCase) -> Self {
        Self {
            renderer,
            extension_case,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    #[must_use]
    pub fn extension_case(&self) -> ExtensionCase {
        self.extension_case
    }
}

impl Default for GalleryState {
    fn default() -> Self {
        Self::new(Arc::new(MaudRenderer), ExtensionCase::platform())
    }
}

impl std::fmt::Debug for GalleryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryState")
            .field("extension_case", &self.extension_case)
            .finish_non_exhaustive()
    }
}

/// Failure of a browsing request.
///
/// Clients only ever see the status line; the cause is logged.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    List(#[from] ListError),
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Path(PathError::OutOfBounds | PathError::NotFound | PathError::WrongKind)
            | Self::List(ListError::NotADirectory) => StatusCode::NOT_FOUND,
            Self::Path(PathError::Io(_)) | Self::List(ListError::Io(_)) => StatusCode::FORBIDDEN,
            Self::List(ListError::InvalidPage(_)) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Path(PathError::OutOfBounds) => warn!("Rejected path outside the authorized root"),
            Self::Internal(_) => error!("{self}"),
            _ => debug!("{self}"),
        }
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}

/// Wildcard captures are relative to the session root. A capture that does
/// not decode names nothing under it.
pub(crate) fn relative_capture(
    capture: Result<Path<String>, PathRejection>,
) -> Result<String, HandlerError> {
    match capture {
        Ok(Path(path)) => Ok(path.trim_start_matches('/').to_string()),
        Err(rejection) => {
            debug!("Undecodable path capture: {rejection}");
            Err(PathError::NotFound.into())
        }
    }
}

/// Run filesystem work off the async workers.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, HandlerError>
where
    F: FnOnce() -> Result<T, HandlerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| HandlerError::Internal(format!("filesystem task failed: {e}")))?
}
