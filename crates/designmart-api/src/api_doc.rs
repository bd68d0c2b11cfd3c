//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use designmart_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Designmart API",
        version = "0.1.0",
        description = "Design marketplace ingestion, review, and delivery API. \
                       Uploads go through validation into a pending review queue; \
                       approved designs are served through the protected /uploads route."
    ),
    paths(
        handlers::design_upload::upload_design,
        handlers::my_designs::list_my_designs,
        handlers::design_delete::delete_design,
        handlers::review::list_pending,
        handlers::review::decide_design,
        handlers::file_delivery::serve_asset,
    ),
    components(
        schemas(
            models::ReviewState,
            models::RawFormat,
            models::StoredFile,
            models::DesignSummary,
            models::PendingDesign,
            models::OwnerStats,
            models::PageInfo,
            handlers::design_upload::UploadResponse,
            handlers::my_designs::MyDesignsResponse,
            handlers::my_designs::OwnedDesignView,
            handlers::review::PendingListResponse,
            handlers::review::PendingDesignView,
            handlers::review::UploadedBy,
            handlers::review::DecisionRequest,
            handlers::review::DecisionResponse,
            handlers::design_delete::DeleteResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "designs", description = "Upload and owner management"),
        (name = "review", description = "Admin review queue"),
        (name = "delivery", description = "Protected file delivery")
    )
)]
pub struct ApiDoc;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
