use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use mime_guess::from_path;
use rust_embed::RustEmbed;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::handlers::AppState;

#[derive(RustEmbed)]
#[folder = "frontend/dist"]
pub struct Assets;

/// Serve static files from the configured directory or the embedded bundle
pub async fn serve_static(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Try to serve from filesystem if static_dir is provided
    if let Some(ref dir) = state.frontend.static_dir {
        if let Some(file_path) = resolve_in(dir, path) {
            if let Ok(content) = tokio::fs::read(&file_path).await {
                let mime_type = from_path(&file_path).first_or_octet_stream();
                return file_response(mime_type.as_ref(), Body::from(content));
            }
        }
    }

    // Fall back to embedded assets
    serve_embedded(path)
}

/// Join `path` under `dir`, refusing anything that could escape it
fn resolve_in(dir: &str, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(PathBuf::from(dir).join(relative))
}

fn file_response(mime: &str, body: Body) -> Response {
    ([(header::CONTENT_TYPE, mime.to_string())], body).into_response()
}

/// Serve from embedded assets
fn serve_embedded(path: &str) -> Response {
    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = from_path(path).first_or_octet_stream();
            file_response(mime.as_ref(), Body::from(content.data))
        }
        None => {
            // For SPA routing, serve index.html for non-file paths
            if !path.contains('.') {
                if let Some(index) = Assets::get("index.html") {
                    return file_response("text/html", Body::from(index.data));
                }
            }
            (StatusCode::NOT_FOUND, "404 Not Found").into_response()
        }
    }
}
