use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use designmart_core::models::DesignSummary;
use designmart_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::{FilePart, UploadForm};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub design: DesignSummary,
}

/// Upload a new design
///
/// Accepts a multipart form with title, description, category, tags, one
/// preview image and one or more raw source files. The design is created in
/// the pending state and is not publicly visible until approved.
#[utoipa::path(
    post,
    path = "/api/v0/designs",
    tag = "designs",
    responses(
        (status = 201, description = "Design created and awaiting review", body = UploadResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Uploader not approved", body = ErrorResponse),
        (status = 413, description = "File exceeds size limit", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn upload_design(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = parse_upload_form(multipart).await?;
    let summary = state.ingest.ingest(&ctx, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: "Design uploaded successfully and is pending review".to_string(),
            design: summary,
        }),
    ))
}

/// Drains the multipart stream into an [`UploadForm`]. Unknown field names
/// are ignored; validation of the collected values happens in the ingest
/// service, not here.
async fn parse_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = read_text(field, "title").await?,
            "description" => form.description = read_text(field, "description").await?,
            "category" => form.category = read_text(field, "category").await?,
            "tags" => form.tags = read_text(field, "tags").await?,
            "previewImage" => form.preview = Some(read_file(field).await?),
            "rawFiles" => form.raw_files.push(read_file(field).await?),
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field '{}': {}", name, e)))
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<FilePart, AppError> {
    let original_name = field.file_name().unwrap_or("unnamed").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file '{}': {}", original_name, e)))?
        .to_vec();

    Ok(FilePart {
        original_name,
        content_type,
        data,
    })
}
