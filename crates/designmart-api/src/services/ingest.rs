//! Ingestion orchestrator: validate → create record → write files → attach.
//!
//! Record creation and file writes span two storage systems with no shared
//! transaction, so any failure after the record exists triggers compensating
//! deletion: the record is removed and the design's storage subtree is wiped
//! best-effort. Cleanup failures are logged, never allowed to mask the
//! original error.

use std::sync::Arc;
use std::time::Duration;

use designmart_core::models::{DesignSummary, FileRole, NewDesign, RawFormat, StoredFile};
use designmart_core::validation::{
    parse_tags, require_field, AssetValidator, FileUpload, ValidationError,
};
use designmart_core::AppError;
use designmart_db::DesignStore;
use designmart_storage::DesignVault;
use uuid::Uuid;

use crate::auth::{AuthContext, UserRole};

/// One file lifted out of the multipart form.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FilePart {
    fn upload_view(&self) -> FileUpload {
        FileUpload {
            original_name: self.original_name.clone(),
            content_type: self.content_type.clone(),
            size_bytes: self.data.len(),
        }
    }
}

/// Parsed upload request: text fields plus the preview and raw file parts.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: String,
    pub preview: Option<FilePart>,
    pub raw_files: Vec<FilePart>,
}

#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn DesignStore>,
    vault: DesignVault,
    validator: AssetValidator,
    write_timeout: Duration,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn DesignStore>,
        vault: DesignVault,
        validator: AssetValidator,
        write_timeout: Duration,
    ) -> Self {
        Self {
            store,
            vault,
            validator,
            write_timeout,
        }
    }

    /// Run one upload request end to end.
    ///
    /// Steps 1-4 are pure validation with no side effects; the record is
    /// created only once every input has passed, and every failure after
    /// that point compensates before propagating.
    #[tracing::instrument(skip(self, ctx, form), fields(user_id = %ctx.user_id))]
    pub async fn ingest(
        &self,
        ctx: &AuthContext,
        form: UploadForm,
    ) -> Result<DesignSummary, AppError> {
        match ctx.role {
            UserRole::Admin => {}
            UserRole::Designer if ctx.approved => {}
            UserRole::Designer => return Err(AppError::UploaderNotApproved),
            UserRole::Buyer => {
                return Err(AppError::Forbidden(
                    "Only designers can upload designs".to_string(),
                ))
            }
        }

        let title = require_field(&form.title, "Title")?;
        let description = require_field(&form.description, "Description")?;
        let category = require_field(&form.category, "Category")?;
        let tags = parse_tags(&form.tags);

        let preview = form
            .preview
            .filter(|p| !p.data.is_empty())
            .ok_or(ValidationError::MissingField {
                field: "Preview image",
            })?;
        self.validator.check_preview(&preview.upload_view())?;

        // Zero-byte entries are a client-side form quirk, skipped silently.
        let mut raws: Vec<(FilePart, RawFormat)> = Vec::new();
        for part in form.raw_files {
            if part.data.is_empty() {
                continue;
            }
            let format = self.validator.check_raw(&part.upload_view())?;
            raws.push((part, format));
        }
        if raws.is_empty() {
            return Err(ValidationError::NoRawFiles.into());
        }

        let design = self
            .store
            .create(NewDesign {
                title,
                description,
                category,
                tags,
                owner_id: ctx.user_id,
            })
            .await?;

        tracing::info!(
            design_id = %design.id,
            raw_count = raws.len(),
            "Design record created, writing files"
        );

        if let Err(err) = self.persist_files(design.id, preview, raws).await {
            self.compensate(design.id).await;
            return Err(err);
        }

        Ok(DesignSummary::from(&design))
    }

    async fn persist_files(
        &self,
        design_id: Uuid,
        preview: FilePart,
        raws: Vec<(FilePart, RawFormat)>,
    ) -> Result<(), AppError> {
        let stored_preview = self
            .write(design_id, FileRole::Preview, preview, None)
            .await?;

        // Raw files are written in submitted order.
        let mut stored_raws = Vec::with_capacity(raws.len());
        for (part, format) in raws {
            stored_raws.push(
                self.write(design_id, FileRole::Raw, part, Some(format))
                    .await?,
            );
        }

        self.store.attach_preview(design_id, stored_preview).await?;
        self.store.attach_raw_files(design_id, stored_raws).await?;
        Ok(())
    }

    /// One bounded vault write. A timeout is treated exactly like an I/O
    /// failure so the caller's compensation path covers both.
    async fn write(
        &self,
        design_id: Uuid,
        role: FileRole,
        part: FilePart,
        format: Option<RawFormat>,
    ) -> Result<StoredFile, AppError> {
        let saved = tokio::time::timeout(
            self.write_timeout,
            self.vault.save(
                design_id,
                role,
                &part.original_name,
                &part.content_type,
                format,
                part.data,
            ),
        )
        .await
        .map_err(|_| {
            AppError::Storage(format!(
                "File write timed out after {}s",
                self.write_timeout.as_secs()
            ))
        })?;
        Ok(saved?)
    }

    /// Compensating deletion: record first, then the storage subtree.
    /// Best-effort on both; failures are logged and swallowed so the
    /// original ingestion error propagates unchanged.
    async fn compensate(&self, design_id: Uuid) {
        if let Err(e) = self.store.delete(design_id).await {
            tracing::warn!(
                error = %e,
                design_id = %design_id,
                "Failed to delete design record during rollback"
            );
        }
        if let Err(e) = self.vault.delete_subtree(design_id).await {
            tracing::warn!(
                error = %e,
                design_id = %design_id,
                "Failed to delete storage subtree during rollback"
            );
        }
    }
}
