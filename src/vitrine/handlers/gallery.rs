use super::{blocking, relative_capture, GalleryState, HandlerError};
use crate::vitrine::{
    auth::Session,
    files::{confine, list_page},
    render::View,
};
use axum::{
    extract::{rejection::PathRejection, Extension, Path, Query},
    response::Html,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    page: Option<i64>,
}

impl GalleryQuery {
    /// Requested page, with anything below 1 treated as the first page.
    #[must_use]
    pub fn page_number(&self) -> usize {
        self.page
            .and_then(|page| usize::try_from(page).ok())
            .unwrap_or(1)
            .max(1)
    }
}

// axum handler for one page of the session root
pub async fn gallery_root(
    Extension(session): Extension<Session>,
    Extension(gallery): Extension<Arc<GalleryState>>,
    Query(query): Query<GalleryQuery>,
) -> Result<Html<String>, HandlerError> {
    render_page(session, &gallery, String::new(), query.page_number()).await
}

// axum handler for one page of a folder below the session root
pub async fn gallery(
    Extension(session): Extension<Session>,
    Extension(gallery): Extension<Arc<GalleryState>>,
    folder_path: Result<Path<String>, PathRejection>,
    Query(query): Query<GalleryQuery>,
) -> Result<Html<String>, HandlerError> {
    let folder_path = relative_capture(folder_path)?;
    render_page(session, &gallery, folder_path, query.page_number()).await
}

async fn render_page(
    session: Session,
    gallery: &GalleryState,
    folder_path: String,
    page_number: usize,
) -> Result<Html<String>, HandlerError> {
    debug!(folder = %folder_path, page = page_number, "gallery");

    let root = session.authorized_root.clone();
    let case = gallery.extension_case();
    let (folder, page) = blocking(move || {
        let dir = confine(&root, &folder_path)?.require_dir()?;
        let page = list_page(&dir, page_number, case)?;
        Ok((dir.relative_slash(), page))
    })
    .await?;

    Ok(Html(gallery.renderer().render(&View::Gallery {
        username: &session.username,
        folder: &folder,
        page: &page,
    })))
}
