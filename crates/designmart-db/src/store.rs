use async_trait::async_trait;
use designmart_core::models::{
    Design, DesignFilter, DesignSort, NewDesign, OwnerStats, Page, PageInfo, PendingDesign,
    ReviewState, StoredFile,
};
use designmart_core::AppError;
use uuid::Uuid;

/// Lifecycle store for design records.
///
/// Single-document-atomic semantics: every method is one store round-trip;
/// the ingestion orchestrator compensates across calls when it has to.
#[async_trait]
pub trait DesignStore: Send + Sync {
    /// Insert a new design in `pending` state with no file descriptors.
    async fn create(&self, new_design: NewDesign) -> Result<Design, AppError>;

    /// Attach the preview descriptor. Idempotent field update.
    async fn attach_preview(&self, id: Uuid, file: StoredFile) -> Result<(), AppError>;

    /// Attach the raw-file descriptors. Idempotent field update.
    async fn attach_raw_files(&self, id: Uuid, files: Vec<StoredFile>) -> Result<(), AppError>;

    /// Transition from `pending` to the given state, stamping the reviewer.
    ///
    /// Any current state other than `pending` yields
    /// [`AppError::InvalidTransition`]; the conditional update doubles as the
    /// guard against double-approval races.
    async fn set_state(
        &self,
        id: Uuid,
        new_state: ReviewState,
        reviewer_id: Uuid,
    ) -> Result<Design, AppError>;

    /// Remove the metadata record. Does not touch storage.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Design>, AppError>;

    /// Filtered, sorted, paginated listing with total count for UI paging.
    async fn list(
        &self,
        filter: DesignFilter,
        sort: DesignSort,
        page: Page,
    ) -> Result<(Vec<Design>, PageInfo), AppError>;

    /// Pending designs for the review queue, newest first, joined with the
    /// uploader's email. `preview_image_url` holds the relative storage path;
    /// the HTTP layer prefixes the public base URL.
    async fn list_pending(&self) -> Result<Vec<PendingDesign>, AppError>;

    /// Aggregate per-state counts and counters for one owner.
    async fn owner_stats(&self, owner_id: Uuid) -> Result<OwnerStats, AppError>;
}
