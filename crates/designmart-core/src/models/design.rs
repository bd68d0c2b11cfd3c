use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum number of tags a design may carry.
pub const MAX_TAGS: usize = 10;

/// Review lifecycle state of a design.
///
/// Designs are created `pending` and move exactly once to `approved` or
/// `rejected`. There is no transition out of a decided state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    Pending,
    Approved,
    Rejected,
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::Pending => "pending",
            ReviewState::Approved => "approved",
            ReviewState::Rejected => "rejected",
        }
    }
}

impl Display for ReviewState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewState::Pending),
            "approved" => Ok(ReviewState::Approved),
            "rejected" => Ok(ReviewState::Rejected),
            other => Err(format!("unknown review state: {}", other)),
        }
    }
}

/// Role of a stored file within a design bundle.
///
/// The role is decided once at ingest time and carried explicitly; it is
/// never re-derived from path substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Preview,
    Raw,
}

impl FileRole {
    /// Path segment used in the on-disk layout (`designs/<id>/<segment>/`).
    pub fn as_segment(&self) -> &'static str {
        match self {
            FileRole::Preview => "preview",
            FileRole::Raw => "raw",
        }
    }
}

/// Proprietary source-file format, derived from content type with filename
/// extension fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RawFormat {
    Psd,
    Pdf,
    Ai,
    Svg,
    Eps,
    Cdr,
}

impl RawFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawFormat::Psd => "psd",
            RawFormat::Pdf => "pdf",
            RawFormat::Ai => "ai",
            RawFormat::Svg => "svg",
            RawFormat::Eps => "eps",
            RawFormat::Cdr => "cdr",
        }
    }
}

impl Display for RawFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for RawFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "psd" => Ok(RawFormat::Psd),
            "pdf" => Ok(RawFormat::Pdf),
            "ai" => Ok(RawFormat::Ai),
            "svg" => Ok(RawFormat::Svg),
            "eps" => Ok(RawFormat::Eps),
            "cdr" => Ok(RawFormat::Cdr),
            other => Err(format!("unknown raw format: {}", other)),
        }
    }
}

/// Stored-file descriptor embedded in a design record.
///
/// `file_name` is generated (opaque, collision-resistant); `original_name` is
/// the client-supplied name kept for display only and never used to build
/// paths. `relative_path` is rooted under the owning design's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredFile {
    pub file_name: String,
    pub original_name: String,
    pub relative_path: String,
    pub size_bytes: i64,
    pub content_type: String,
    /// Set for raw files; `None` for the preview image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<RawFormat>,
}

/// The central entity: one uploaded creative asset bundle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Design {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub owner_id: Uuid,
    pub state: ReviewState,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Exactly one preview once ingestion completes; `None` only while the
    /// record is being assembled mid-ingest.
    pub preview: Option<StoredFile>,
    pub raw_files: Vec<StoredFile>,
    /// Aggregate counters mutated by collaborators outside this pipeline.
    pub view_count: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a design record (state starts `pending`,
/// descriptors are attached after the files are written).
#[derive(Debug, Clone)]
pub struct NewDesign {
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub owner_id: Uuid,
}

/// Minimal public projection returned by the upload endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DesignSummary {
    pub id: Uuid,
    pub title: String,
    pub state: ReviewState,
}

impl From<&Design> for DesignSummary {
    fn from(design: &Design) -> Self {
        DesignSummary {
            id: design.id,
            title: design.title.clone(),
            state: design.state,
        }
    }
}

/// Row shape for the admin review queue listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingDesign {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub preview_image_url: String,
    pub uploader_email: String,
}

/// Owner-scoped aggregate stats shown next to the my-designs listing.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total_views: i64,
    pub total_downloads: i64,
}

/// Filter for design listings; `None` fields are unconstrained.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesignFilter {
    pub owner_id: Option<Uuid>,
    pub state: Option<ReviewState>,
}

/// Sort order for design listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesignSort {
    #[default]
    Newest,
    Oldest,
    MostViewed,
    MostDownloaded,
    Title,
}

impl FromStr for DesignSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(DesignSort::Newest),
            "oldest" => Ok(DesignSort::Oldest),
            "mostViewed" => Ok(DesignSort::MostViewed),
            "mostDownloaded" => Ok(DesignSort::MostDownloaded),
            "title" => Ok(DesignSort::Title),
            other => Err(format!("unknown sort: {}", other)),
        }
    }
}

/// Page request, 1-based. Limit is clamped to 1..=100.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> Self {
        Page {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(1, Self::DEFAULT_LIMIT)
    }
}

/// Paging metadata returned alongside a listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(total: i64, page: &Page) -> Self {
        let consumed = page.offset() + page.limit as i64;
        PageInfo {
            total,
            page: page.page,
            limit: page.limit,
            has_next: consumed < total,
            has_prev: page.page > 1,
        }
    }
}
