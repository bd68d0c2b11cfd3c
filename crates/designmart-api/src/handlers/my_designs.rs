use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use designmart_core::models::{
    Design, DesignFilter, DesignSort, OwnerStats, Page, PageInfo, ReviewState,
};
use designmart_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MyDesignsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(rename = "sortBy", default = "default_sort")]
    pub sort_by: String,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    Page::DEFAULT_LIMIT
}

fn default_status() -> String {
    "all".to_string()
}

fn default_sort() -> String {
    "newest".to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyDesignsResponse {
    pub success: bool,
    pub designs: Vec<OwnedDesignView>,
    pub pagination: PageInfo,
    pub stats: OwnerStats,
}

/// Owner-facing projection of a design row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedDesignView {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub state: ReviewState,
    pub preview_image_url: Option<String>,
    pub view_count: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

/// List the caller's own designs
///
/// Paginated and sortable; `status` narrows to one review state or `all`.
#[utoipa::path(
    get,
    path = "/api/v0/designs/mine",
    tag = "designs",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, clamped to 100"),
        ("status" = Option<String>, Query, description = "all, pending, approved or rejected"),
        ("sortBy" = Option<String>, Query, description = "newest, oldest, mostViewed, mostDownloaded or title")
    ),
    responses(
        (status = 200, description = "Designs owned by the caller", body = MyDesignsResponse),
        (status = 400, description = "Unknown status or sort value", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_my_designs(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(query): Query<MyDesignsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let status = match query.status.as_str() {
        "all" => None,
        other => Some(
            ReviewState::from_str(other)
                .map_err(|_| AppError::Validation(format!("Unknown status: {}", other)))?,
        ),
    };
    let sort = DesignSort::from_str(&query.sort_by)
        .map_err(|_| AppError::Validation(format!("Unknown sort: {}", query.sort_by)))?;

    let filter = DesignFilter {
        owner_id: Some(ctx.user_id),
        state: status,
    };
    let page = Page::new(query.page, query.limit);

    let (designs, pagination) = state.store.list(filter, sort, page).await?;
    let stats = state.store.owner_stats(ctx.user_id).await?;

    let designs = designs.iter().map(|d| into_view(&state, d)).collect();

    Ok(Json(MyDesignsResponse {
        success: true,
        designs,
        pagination,
        stats,
    }))
}

fn into_view(state: &AppState, design: &Design) -> OwnedDesignView {
    OwnedDesignView {
        id: design.id,
        title: design.title.clone(),
        category: design.category.clone(),
        tags: design.tags.clone(),
        state: design.state,
        preview_image_url: design
            .preview
            .as_ref()
            .map(|p| state.asset_url(&p.relative_path)),
        view_count: design.view_count,
        download_count: design.download_count,
        created_at: design.created_at,
    }
}
