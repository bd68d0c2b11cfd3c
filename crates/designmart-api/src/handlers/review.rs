use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use designmart_core::models::{DesignSummary, PendingDesign, ReviewState};
use designmart_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingListResponse {
    pub success: bool,
    pub designs: Vec<PendingDesignView>,
}

/// Queue entry with the uploader nested the way the admin UI expects it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingDesignView {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub preview_image_url: String,
    pub uploaded_by: UploadedBy,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedBy {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub decision: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    pub success: bool,
    pub message: String,
    pub design: DesignSummary,
}

/// List designs awaiting review
///
/// Admin only. Returns pending designs newest first, each with a fully
/// qualified preview URL and the uploader's email.
#[utoipa::path(
    get,
    path = "/api/v0/designs/pending",
    tag = "review",
    responses(
        (status = 200, description = "Pending designs", body = PendingListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    )
)]
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_manage_designs()?;

    let pending = state.store.list_pending().await?;
    let designs = pending
        .into_iter()
        .map(|d| into_view(&state, d))
        .collect();

    Ok(Json(PendingListResponse {
        success: true,
        designs,
    }))
}

fn into_view(state: &AppState, design: PendingDesign) -> PendingDesignView {
    let preview_image_url = if design.preview_image_url.is_empty() {
        String::new()
    } else {
        state.asset_url(&design.preview_image_url)
    };

    PendingDesignView {
        id: design.id,
        title: design.title,
        category: design.category,
        created_at: design.created_at,
        preview_image_url,
        uploaded_by: UploadedBy {
            email: design.uploader_email,
        },
    }
}

/// Approve or reject a pending design
///
/// Admin only. `decision` must be `"approve"` or `"reject"`; a design that
/// has already been decided yields 409.
#[utoipa::path(
    post,
    path = "/api/v0/designs/{id}/decision",
    tag = "review",
    params(
        ("id" = Uuid, Path, description = "Design id")
    ),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = DecisionResponse),
        (status = 400, description = "Unknown decision value", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "No such design", body = ErrorResponse),
        (status = 409, description = "Design already decided", body = ErrorResponse)
    )
)]
pub async fn decide_design(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(body): Json<DecisionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_manage_designs()?;

    let new_state = match body.decision.as_str() {
        "approve" => ReviewState::Approved,
        "reject" => ReviewState::Rejected,
        other => {
            return Err(AppError::Validation(format!(
                "Decision must be 'approve' or 'reject', got '{}'",
                other
            ))
            .into())
        }
    };

    let design = state.store.set_state(id, new_state, ctx.user_id).await?;
    tracing::info!(design_id = %id, decision = %body.decision, reviewer = %ctx.user_id, "Design reviewed");

    Ok(Json(DecisionResponse {
        success: true,
        message: format!("Design {}", design.state),
        design: DesignSummary::from(&design),
    }))
}
