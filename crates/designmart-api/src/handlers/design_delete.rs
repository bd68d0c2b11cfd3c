use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use designmart_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a design and its stored files
///
/// Admin only. The metadata record is removed first; the storage subtree is
/// then deleted best-effort, so a failed file cleanup never resurrects the
/// record. Downloads already streaming from an open handle run to
/// completion.
#[utoipa::path(
    delete,
    path = "/api/v0/designs/{id}",
    tag = "designs",
    params(
        ("id" = Uuid, Path, description = "Design id")
    ),
    responses(
        (status = 200, description = "Design deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "No such design", body = ErrorResponse)
    )
)]
pub async fn delete_design(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_manage_designs()?;

    if state.store.get(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Design {} not found", id)).into());
    }

    state.store.delete(id).await?;

    if let Err(e) = state.vault.delete_subtree(id).await {
        tracing::error!(design_id = %id, error = %e, "Failed to delete design files; record already removed");
    }

    tracing::info!(design_id = %id, admin = %ctx.user_id, "Design deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Design deleted".to_string(),
    }))
}
