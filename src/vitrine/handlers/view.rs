use super::{blocking, relative_capture, HandlerError};
use crate::vitrine::{
    auth::Session,
    files::{confine, PathError},
};
use axum::{
    body::Body,
    extract::{rejection::PathRejection, Extension, Path},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

#[utoipa::path(
    get,
    path= "/view/{file_path}",
    params(
        ("file_path" = String, Path, description = "File path relative to the session root")
    ),
    responses (
        (status = 200, description = "Raw file bytes, content type inferred from the extension"),
        (status = 303, description = "No valid session, redirect to /login"),
        (status = 403, description = "File cannot be read"),
        (status = 404, description = "No such file under the session root"),
    ),
    tag= "files"
)]
// axum handler streaming a file from the session root
pub async fn view_file(
    Extension(session): Extension<Session>,
    file_path: Result<Path<String>, PathRejection>,
) -> Result<Response, HandlerError> {
    let file_path = relative_capture(file_path)?;
    let root = session.authorized_root.clone();
    let file = blocking(move || Ok(confine(&root, &file_path)?.require_file()?)).await?;

    let handle = tokio::fs::File::open(file.as_path())
        .await
        .map_err(|e| PathError::from_io(e, file.as_path()))?;
    let length = handle
        .metadata()
        .await
        .map_err(|e| PathError::from_io(e, file.as_path()))?
        .len();

    let mime = mime_guess::from_path(file.as_path()).first_or_octet_stream();

    Ok((
        [
            (CONTENT_TYPE, mime.essence_str().to_string()),
            (CONTENT_LENGTH, length.to_string()),
        ],
        Body::from_stream(ReaderStream::new(handle)),
    )
        .into_response())
}
