//! In-memory design store, used as a test double for orchestrator and
//! handler tests. Semantics mirror [`crate::PgDesignStore`], including the
//! pending-only transition guard and listing order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use designmart_core::models::{
    Design, DesignFilter, DesignSort, NewDesign, OwnerStats, Page, PageInfo, PendingDesign,
    ReviewState, StoredFile,
};
use designmart_core::AppError;
use uuid::Uuid;

use crate::store::DesignStore;

#[derive(Default)]
pub struct InMemoryDesignStore {
    designs: Mutex<HashMap<Uuid, Design>>,
    uploader_emails: Mutex<HashMap<Uuid, String>>,
    next_id: Mutex<Option<Uuid>>,
    fail_attach_raw: AtomicBool,
}

impl InMemoryDesignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an uploader email for the pending-review join.
    pub fn register_uploader(&self, owner_id: Uuid, email: &str) {
        self.uploader_emails
            .lock()
            .unwrap()
            .insert(owner_id, email.to_string());
    }

    /// Force the next created design to use a known id (lets tests pre-arrange
    /// filesystem conditions for that design's subtree).
    pub fn set_next_id(&self, id: Uuid) {
        *self.next_id.lock().unwrap() = Some(id);
    }

    /// Make the next `attach_raw_files` call fail, simulating a store outage
    /// after files were already written.
    pub fn fail_next_attach_raw(&self) {
        self.fail_attach_raw.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.designs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DesignStore for InMemoryDesignStore {
    async fn create(&self, new_design: NewDesign) -> Result<Design, AppError> {
        let id = self
            .next_id
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let design = Design {
            id,
            title: new_design.title,
            description: new_design.description,
            category: new_design.category,
            tags: new_design.tags,
            owner_id: new_design.owner_id,
            state: ReviewState::Pending,
            reviewed_by: None,
            reviewed_at: None,
            preview: None,
            raw_files: vec![],
            view_count: 0,
            download_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.designs.lock().unwrap().insert(id, design.clone());
        Ok(design)
    }

    async fn attach_preview(&self, id: Uuid, file: StoredFile) -> Result<(), AppError> {
        let mut designs = self.designs.lock().unwrap();
        let design = designs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Design {} not found", id)))?;
        design.preview = Some(file);
        design.updated_at = Utc::now();
        Ok(())
    }

    async fn attach_raw_files(&self, id: Uuid, files: Vec<StoredFile>) -> Result<(), AppError> {
        if self.fail_attach_raw.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        let mut designs = self.designs.lock().unwrap();
        let design = designs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Design {} not found", id)))?;
        design.raw_files = files;
        design.updated_at = Utc::now();
        Ok(())
    }

    async fn set_state(
        &self,
        id: Uuid,
        new_state: ReviewState,
        reviewer_id: Uuid,
    ) -> Result<Design, AppError> {
        let mut designs = self.designs.lock().unwrap();
        let design = designs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Design {} not found", id)))?;
        if design.state != ReviewState::Pending {
            return Err(AppError::InvalidTransition { from: design.state });
        }
        design.state = new_state;
        design.reviewed_by = Some(reviewer_id);
        design.reviewed_at = Some(Utc::now());
        design.updated_at = Utc::now();
        Ok(design.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.designs.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Design>, AppError> {
        Ok(self.designs.lock().unwrap().get(&id).cloned())
    }

    async fn list(
        &self,
        filter: DesignFilter,
        sort: DesignSort,
        page: Page,
    ) -> Result<(Vec<Design>, PageInfo), AppError> {
        let designs = self.designs.lock().unwrap();
        let mut matching: Vec<Design> = designs
            .values()
            .filter(|d| filter.owner_id.map_or(true, |o| d.owner_id == o))
            .filter(|d| filter.state.map_or(true, |s| d.state == s))
            .cloned()
            .collect();

        match sort {
            DesignSort::Newest => {
                matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)))
            }
            DesignSort::Oldest => {
                matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            }
            DesignSort::MostViewed => {
                matching.sort_by(|a, b| b.view_count.cmp(&a.view_count).then(a.id.cmp(&b.id)))
            }
            DesignSort::MostDownloaded => matching
                .sort_by(|a, b| b.download_count.cmp(&a.download_count).then(a.id.cmp(&b.id))),
            DesignSort::Title => {
                matching.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)))
            }
        }

        let total = matching.len() as i64;
        let start = (page.offset() as usize).min(matching.len());
        let end = (start + page.limit as usize).min(matching.len());
        let slice = matching[start..end].to_vec();

        Ok((slice, PageInfo::new(total, &page)))
    }

    async fn list_pending(&self) -> Result<Vec<PendingDesign>, AppError> {
        let designs = self.designs.lock().unwrap();
        let emails = self.uploader_emails.lock().unwrap();
        let mut pending: Vec<&Design> = designs
            .values()
            .filter(|d| d.state == ReviewState::Pending)
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(pending
            .into_iter()
            .map(|d| PendingDesign {
                id: d.id,
                title: d.title.clone(),
                category: d.category.clone(),
                created_at: d.created_at,
                preview_image_url: d
                    .preview
                    .as_ref()
                    .map(|p| p.relative_path.clone())
                    .unwrap_or_default(),
                uploader_email: emails.get(&d.owner_id).cloned().unwrap_or_default(),
            })
            .collect())
    }

    async fn owner_stats(&self, owner_id: Uuid) -> Result<OwnerStats, AppError> {
        let designs = self.designs.lock().unwrap();
        let mut stats = OwnerStats::default();
        for design in designs.values().filter(|d| d.owner_id == owner_id) {
            stats.total += 1;
            match design.state {
                ReviewState::Pending => stats.pending += 1,
                ReviewState::Approved => stats.approved += 1,
                ReviewState::Rejected => stats.rejected += 1,
            }
            stats.total_views += design.view_count;
            stats.total_downloads += design.download_count;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_design(owner_id: Uuid, title: &str) -> NewDesign {
        NewDesign {
            title: title.to_string(),
            description: "desc".to_string(),
            category: "poster".to_string(),
            tags: vec!["art".to_string()],
            owner_id,
        }
    }

    #[tokio::test]
    async fn create_starts_pending_without_descriptors() {
        let store = InMemoryDesignStore::new();
        let design = store
            .create(new_design(Uuid::new_v4(), "Poster"))
            .await
            .unwrap();
        assert_eq!(design.state, ReviewState::Pending);
        assert!(design.preview.is_none());
        assert!(design.raw_files.is_empty());
    }

    #[tokio::test]
    async fn double_decision_is_invalid_transition() {
        let store = InMemoryDesignStore::new();
        let reviewer = Uuid::new_v4();
        let design = store
            .create(new_design(Uuid::new_v4(), "Poster"))
            .await
            .unwrap();

        store
            .set_state(design.id, ReviewState::Approved, reviewer)
            .await
            .unwrap();
        let err = store
            .set_state(design.id, ReviewState::Approved, reviewer)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: ReviewState::Approved
            }
        ));
    }

    #[tokio::test]
    async fn list_paginates_deterministically() {
        let store = InMemoryDesignStore::new();
        let owner = Uuid::new_v4();
        for i in 0..25 {
            store
                .create(new_design(owner, &format!("design-{:02}", i)))
                .await
                .unwrap();
        }

        let (page2, info) = store
            .list(
                DesignFilter {
                    owner_id: Some(owner),
                    state: None,
                },
                DesignSort::Title,
                Page::new(2, 10),
            )
            .await
            .unwrap();

        assert_eq!(page2.len(), 10);
        assert_eq!(page2[0].title, "design-10");
        assert_eq!(page2[9].title, "design-19");
        assert_eq!(info.total, 25);
        assert!(info.has_next);
        assert!(info.has_prev);
    }

    #[tokio::test]
    async fn owner_stats_aggregate_states() {
        let store = InMemoryDesignStore::new();
        let owner = Uuid::new_v4();
        let reviewer = Uuid::new_v4();

        let a = store.create(new_design(owner, "a")).await.unwrap();
        let _b = store.create(new_design(owner, "b")).await.unwrap();
        store
            .set_state(a.id, ReviewState::Approved, reviewer)
            .await
            .unwrap();
        // Another owner's designs do not leak into the stats.
        store
            .create(new_design(Uuid::new_v4(), "c"))
            .await
            .unwrap();

        let stats = store.owner_stats(owner).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.pending, 1);
    }
}
