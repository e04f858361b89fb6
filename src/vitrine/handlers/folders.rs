use super::{blocking, GalleryState, HandlerError};
use crate::vitrine::{
    auth::Session,
    files::{confine, list_folders},
    render::View,
};
use axum::{extract::Extension, response::Html};
use std::sync::Arc;

// axum handler for the top-level folder list
pub async fn folders(
    Extension(session): Extension<Session>,
    Extension(gallery): Extension<Arc<GalleryState>>,
) -> Result<Html<String>, HandlerError> {
    let root = session.authorized_root.clone();
    let folders = blocking(move || Ok(list_folders(&confine(&root, ".")?)?)).await?;

    Ok(Html(gallery.renderer().render(&View::Folders {
        username: &session.username,
        folders: &folders,
    })))
}
