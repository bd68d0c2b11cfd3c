use async_trait::async_trait;
use chrono::{DateTime, Utc};
use designmart_core::models::{
    Design, DesignFilter, DesignSort, NewDesign, OwnerStats, Page, PageInfo, PendingDesign,
    ReviewState, StoredFile,
};
use designmart_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use uuid::Uuid;

use crate::store::DesignStore;

const DESIGN_COLUMNS: &str = "id, title, description, category, tags, owner_id, state, \
     reviewed_by, reviewed_at, preview, raw_files, view_count, download_count, \
     created_at, updated_at";

/// Row shape for the `designs` table. Descriptors are stored as JSONB so a
/// design updates as one document, matching the atomicity the pipeline
/// assumes.
#[derive(Debug, sqlx::FromRow)]
struct DesignRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    tags: Vec<String>,
    owner_id: Uuid,
    state: String,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    preview: Option<serde_json::Value>,
    raw_files: serde_json::Value,
    view_count: i64,
    download_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DesignRow {
    fn into_design(self) -> Result<Design, AppError> {
        let state = ReviewState::from_str(&self.state)
            .map_err(|e| AppError::Internal(format!("Corrupt design row {}: {}", self.id, e)))?;
        let preview = self
            .preview
            .map(serde_json::from_value::<StoredFile>)
            .transpose()?;
        let raw_files: Vec<StoredFile> = serde_json::from_value(self.raw_files)?;

        Ok(Design {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            tags: self.tags,
            owner_id: self.owner_id,
            state,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            preview,
            raw_files,
            view_count: self.view_count,
            download_count: self.download_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    id: Uuid,
    title: String,
    category: String,
    created_at: DateTime<Utc>,
    preview_path: String,
    uploader_email: String,
}

fn order_clause(sort: DesignSort) -> &'static str {
    match sort {
        DesignSort::Newest => " ORDER BY created_at DESC, id ASC",
        DesignSort::Oldest => " ORDER BY created_at ASC, id ASC",
        DesignSort::MostViewed => " ORDER BY view_count DESC, id ASC",
        DesignSort::MostDownloaded => " ORDER BY download_count DESC, id ASC",
        DesignSort::Title => " ORDER BY title ASC, id ASC",
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &DesignFilter) {
    if let Some(owner_id) = filter.owner_id {
        qb.push(" AND owner_id = ").push_bind(owner_id);
    }
    if let Some(state) = filter.state {
        qb.push(" AND state = ").push_bind(state.as_str());
    }
}

/// Postgres-backed design store.
#[derive(Clone)]
pub struct PgDesignStore {
    pool: PgPool,
}

impl PgDesignStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_row(&self, id: Uuid) -> Result<Option<DesignRow>, AppError> {
        let row = sqlx::query_as::<_, DesignRow>(&format!(
            "SELECT {} FROM designs WHERE id = $1",
            DESIGN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl DesignStore for PgDesignStore {
    async fn create(&self, new_design: NewDesign) -> Result<Design, AppError> {
        let row = sqlx::query_as::<_, DesignRow>(&format!(
            "INSERT INTO designs (id, title, description, category, tags, owner_id, state) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            DESIGN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_design.title)
        .bind(&new_design.description)
        .bind(&new_design.category)
        .bind(&new_design.tags)
        .bind(new_design.owner_id)
        .bind(ReviewState::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(design_id = %row.id, "Design record created");
        row.into_design()
    }

    async fn attach_preview(&self, id: Uuid, file: StoredFile) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE designs SET preview = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(Json(&file))
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Design {} not found", id)));
        }
        Ok(())
    }

    async fn attach_raw_files(&self, id: Uuid, files: Vec<StoredFile>) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE designs SET raw_files = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(Json(&files))
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Design {} not found", id)));
        }
        Ok(())
    }

    async fn set_state(
        &self,
        id: Uuid,
        new_state: ReviewState,
        reviewer_id: Uuid,
    ) -> Result<Design, AppError> {
        // Conditional update: only a pending row transitions, so a concurrent
        // second decision finds zero rows and reports the real current state.
        let row = sqlx::query_as::<_, DesignRow>(&format!(
            "UPDATE designs SET state = $2, reviewed_by = $3, reviewed_at = now(), \
             updated_at = now() WHERE id = $1 AND state = 'pending' RETURNING {}",
            DESIGN_COLUMNS
        ))
        .bind(id)
        .bind(new_state.as_str())
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_design(),
            None => match self.fetch_row(id).await? {
                Some(current) => {
                    let from = ReviewState::from_str(&current.state)
                        .map_err(|e| AppError::Internal(e))?;
                    Err(AppError::InvalidTransition { from })
                }
                None => Err(AppError::NotFound(format!("Design {} not found", id))),
            },
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM designs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Design>, AppError> {
        self.fetch_row(id).await?.map(DesignRow::into_design).transpose()
    }

    async fn list(
        &self,
        filter: DesignFilter,
        sort: DesignSort,
        page: Page,
    ) -> Result<(Vec<Design>, PageInfo), AppError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM designs WHERE TRUE");
        push_filter(&mut count_qb, &filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM designs WHERE TRUE",
            DESIGN_COLUMNS
        ));
        push_filter(&mut qb, &filter);
        qb.push(order_clause(sort));
        qb.push(" LIMIT ").push_bind(page.limit as i64);
        qb.push(" OFFSET ").push_bind(page.offset());

        let rows: Vec<DesignRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let designs = rows
            .into_iter()
            .map(DesignRow::into_design)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((designs, PageInfo::new(total, &page)))
    }

    async fn list_pending(&self) -> Result<Vec<PendingDesign>, AppError> {
        let rows = sqlx::query_as::<_, PendingRow>(
            "SELECT d.id, d.title, d.category, d.created_at, \
                    COALESCE(d.preview->>'relative_path', '') AS preview_path, \
                    COALESCE(u.email, '') AS uploader_email \
             FROM designs d \
             LEFT JOIN users u ON u.id = d.owner_id \
             WHERE d.state = 'pending' \
             ORDER BY d.created_at DESC, d.id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PendingDesign {
                id: r.id,
                title: r.title,
                category: r.category,
                created_at: r.created_at,
                preview_image_url: r.preview_path,
                uploader_email: r.uploader_email,
            })
            .collect())
    }

    async fn owner_stats(&self, owner_id: Uuid) -> Result<OwnerStats, AppError> {
        let (total, pending, approved, rejected, total_views, total_downloads): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE state = 'pending'), \
                    COUNT(*) FILTER (WHERE state = 'approved'), \
                    COUNT(*) FILTER (WHERE state = 'rejected'), \
                    COALESCE(SUM(view_count), 0)::BIGINT, \
                    COALESCE(SUM(download_count), 0)::BIGINT \
             FROM designs WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(OwnerStats {
            total,
            pending,
            approved,
            rejected,
            total_views,
            total_downloads,
        })
    }
}
