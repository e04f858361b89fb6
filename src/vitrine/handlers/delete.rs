use super::{blocking, relative_capture, HandlerError};
use crate::vitrine::{
    auth::Session,
    files::{confine, PathError},
};
use axum::{
    extract::{rejection::PathRejection, Extension, Path},
    http::StatusCode,
};
use std::fs;
use tracing::info;

#[utoipa::path(
    delete,
    path= "/files/{file_path}",
    params(
        ("file_path" = String, Path, description = "File path relative to the session root")
    ),
    responses (
        (status = 204, description = "File deleted"),
        (status = 303, description = "No valid session, redirect to /login"),
        (status = 403, description = "File cannot be removed"),
        (status = 404, description = "No such file under the session root"),
    ),
    tag= "files"
)]
// axum handler removing a file from the session root
pub async fn delete_file(
    Extension(session): Extension<Session>,
    file_path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, HandlerError> {
    let file_path = relative_capture(file_path)?;
    let root = session.authorized_root.clone();
    let removed = blocking(move || {
        let file = confine(&root, &file_path)?.require_file()?;
        // Unlink the named entry; a symlink goes, its target stays.
        fs::remove_file(file.entry_path())
            .map_err(|e| PathError::from_io(e, file.entry_path()))?;
        Ok(file_path)
    })
    .await?;

    info!(user = %session.username, path = %removed, "File deleted");

    Ok(StatusCode::NO_CONTENT)
}
