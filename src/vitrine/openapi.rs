use super::handlers::{delete, health, login, view};
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, login::login, view::view_file, delete::delete_file),
    components(schemas(health::Health, login::LoginForm)),
    tags(
        (name = "health", description = "Service status"),
        (name = "auth", description = "Session login"),
        (name = "files", description = "Files under the session root"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    // Use Cargo.toml metadata instead of the derive defaults.
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        .filter(|description| !description.is_empty());
    doc
}

// axum handler for /openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_json_and_binary_routes() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));

        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for path in ["/health", "/login", "/view/{file_path}", "/files/{file_path}"] {
            assert!(paths.contains(&path), "{path} missing from {paths:?}");
        }
    }
}
