use std::path::{Path, PathBuf};

use designmart_core::models::{FileRole, RawFormat, StoredFile};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

const MAX_EXTENSION_LEN: usize = 10;

/// Filesystem vault for design asset bundles.
///
/// Writes files under `<asset-root>/designs/<design_id>/<role>/` and supports
/// best-effort subtree deletion for compensating cleanup.
#[derive(Clone)]
pub struct DesignVault {
    base_path: PathBuf,
}

impl DesignVault {
    /// Create a new vault rooted at `base_path`, creating the root if absent.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create asset root {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(DesignVault { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Lowercased, sanitized extension of the original filename. Only the
    /// extension survives into the stored name; the rest is discarded.
    fn safe_extension(original_name: &str) -> Option<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_lowercase();
        if ext.is_empty()
            || ext.len() > MAX_EXTENSION_LEN
            || !ext.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return None;
        }
        Some(ext)
    }

    /// Generate an opaque stored filename preserving only the extension.
    fn generate_name(original_name: &str) -> String {
        let id = Uuid::new_v4();
        match Self::safe_extension(original_name) {
            Some(ext) => format!("{}.{}", id, ext),
            None => id.to_string(),
        }
    }

    fn subtree_key(design_id: Uuid) -> String {
        format!("designs/{}", design_id)
    }

    /// Write one file into the design's subtree and return its descriptor.
    ///
    /// Directory creation is idempotent and safe under concurrent requests.
    /// On I/O failure the partially written file may remain; the caller owns
    /// subtree cleanup via [`delete_subtree`](Self::delete_subtree).
    pub async fn save(
        &self,
        design_id: Uuid,
        role: FileRole,
        original_name: &str,
        content_type: &str,
        format: Option<RawFormat>,
        data: Vec<u8>,
    ) -> StorageResult<StoredFile> {
        let file_name = Self::generate_name(original_name);
        let relative_path = format!(
            "{}/{}/{}",
            Self::subtree_key(design_id),
            role.as_segment(),
            file_name
        );
        let path = self.base_path.join(&relative_path);
        let size = data.len();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            design_id = %design_id,
            role = role.as_segment(),
            path = %relative_path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Vault write successful"
        );

        Ok(StoredFile {
            file_name,
            original_name: original_name.to_string(),
            relative_path,
            size_bytes: size as i64,
            content_type: content_type.to_string(),
            format,
        })
    }

    /// Remove the whole storage subtree for a design. Not-found is Ok;
    /// callers in compensating paths log failures and continue.
    pub async fn delete_subtree(&self, design_id: Uuid) -> StorageResult<()> {
        let path = self.base_path.join(Self::subtree_key(design_id));

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_dir_all(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to delete subtree {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(design_id = %design_id, path = %path.display(), "Vault subtree deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_writes_under_design_subtree() {
        let dir = tempdir().unwrap();
        let vault = DesignVault::new(dir.path()).await.unwrap();
        let design_id = Uuid::new_v4();

        let stored = vault
            .save(
                design_id,
                FileRole::Preview,
                "mockup.PNG",
                "image/png",
                None,
                b"fake png".to_vec(),
            )
            .await
            .unwrap();

        assert!(stored
            .relative_path
            .starts_with(&format!("designs/{}/preview/", design_id)));
        assert!(stored.file_name.ends_with(".png"));
        assert_ne!(stored.file_name, "mockup.PNG");
        assert_eq!(stored.size_bytes, 8);

        let on_disk = tokio::fs::read(dir.path().join(&stored.relative_path))
            .await
            .unwrap();
        assert_eq!(on_disk, b"fake png");
    }

    #[tokio::test]
    async fn generated_name_ignores_hostile_original_names() {
        let dir = tempdir().unwrap();
        let vault = DesignVault::new(dir.path()).await.unwrap();
        let design_id = Uuid::new_v4();

        let stored = vault
            .save(
                design_id,
                FileRole::Raw,
                "../../evil.sh",
                "application/pdf",
                Some(RawFormat::Pdf),
                b"data".to_vec(),
            )
            .await
            .unwrap();

        assert!(!stored.file_name.contains(".."));
        assert!(!stored.relative_path.contains(".."));
        assert!(dir
            .path()
            .join(&stored.relative_path)
            .starts_with(dir.path()));
    }

    #[tokio::test]
    async fn extension_without_ascii_alnum_is_dropped() {
        let dir = tempdir().unwrap();
        let vault = DesignVault::new(dir.path()).await.unwrap();

        let stored = vault
            .save(
                Uuid::new_v4(),
                FileRole::Raw,
                "weird.p∂f",
                "application/pdf",
                Some(RawFormat::Pdf),
                b"data".to_vec(),
            )
            .await
            .unwrap();

        // Name is a bare UUID when the extension cannot be sanitized.
        assert!(!stored.file_name.contains('.'));
    }

    #[tokio::test]
    async fn delete_subtree_removes_all_roles() {
        let dir = tempdir().unwrap();
        let vault = DesignVault::new(dir.path()).await.unwrap();
        let design_id = Uuid::new_v4();

        vault
            .save(
                design_id,
                FileRole::Preview,
                "a.png",
                "image/png",
                None,
                b"p".to_vec(),
            )
            .await
            .unwrap();
        vault
            .save(
                design_id,
                FileRole::Raw,
                "b.psd",
                "image/vnd.adobe.photoshop",
                Some(RawFormat::Psd),
                b"r".to_vec(),
            )
            .await
            .unwrap();

        vault.delete_subtree(design_id).await.unwrap();

        let subtree = dir.path().join("designs").join(design_id.to_string());
        assert!(!subtree.exists());
    }

    #[tokio::test]
    async fn delete_subtree_of_unknown_design_is_ok() {
        let dir = tempdir().unwrap();
        let vault = DesignVault::new(dir.path()).await.unwrap();
        assert!(vault.delete_subtree(Uuid::new_v4()).await.is_ok());
    }
}
