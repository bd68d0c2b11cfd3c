//! Protected file delivery: `GET /uploads/{*path}`.
//!
//! Error bodies here are plain text, not JSON, so misconfigured reverse
//! proxies and `<img>` tags get something sensible. Files stream from an
//! open handle, so a design deleted mid-download still finishes serving.

use std::io::ErrorKind;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use designmart_storage::StorageError;
use tokio_util::io::ReaderStream;

use crate::state::AppState;

/// Serve a stored asset
///
/// Resolves the requested path inside the asset root, rejecting traversal
/// attempts, and substitutes the watermarked sibling for preview images
/// when one exists.
#[utoipa::path(
    get,
    path = "/uploads/{path}",
    tag = "delivery",
    params(
        ("path" = String, Path, description = "Relative asset path")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 403, description = "Path escapes the asset root"),
        (status = 404, description = "No such file"),
        (status = 500, description = "Read failure")
    )
)]
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    let resolved = match state.resolver.resolve(&path).await {
        Ok(resolved) => resolved,
        Err(StorageError::PathViolation(_)) => {
            return plain(StatusCode::FORBIDDEN, "Forbidden");
        }
        Err(StorageError::NotFound(_)) => {
            return plain(StatusCode::NOT_FOUND, "Not Found");
        }
        Err(e) => {
            tracing::error!(requested = %path, error = %e, "Asset resolution failed");
            return plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    let file = match tokio::fs::File::open(&resolved.path).await {
        Ok(file) => file,
        // The file can vanish between the stat and the open.
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return plain(StatusCode::NOT_FOUND, "Not Found");
        }
        Err(e) => {
            tracing::error!(path = %resolved.path.display(), error = %e, "Failed to open asset");
            return plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    if resolved.watermarked {
        tracing::debug!(requested = %path, "Serving watermarked preview");
    }

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, resolved.content_type);
    for (name, value) in resolved.headers() {
        builder = builder.header(name, value);
    }

    match builder.body(Body::from_stream(ReaderStream::new(file))) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build delivery response");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn plain(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}
