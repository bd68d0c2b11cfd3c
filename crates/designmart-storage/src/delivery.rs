//! Delivery resolver: maps a requested path onto a file strictly inside the
//! asset root, preferring a watermarked sibling for preview images.
//!
//! Containment is the core security invariant: the canonicalized target must
//! live under the canonicalized asset root, or the request is rejected before
//! any file is opened.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{StorageError, StorageResult};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const WATERMARK_SEGMENT: &str = "watermarked";
const PREVIEW_SEGMENT: &str = "preview";

/// A resolved, containment-checked file ready to serve.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub content_type: &'static str,
    pub is_preview_image: bool,
    /// True when the watermarked sibling was substituted for the original.
    pub watermarked: bool,
}

impl ResolvedFile {
    /// Response headers for this file. Preview images carry anti-download
    /// headers; everything else only gets caching.
    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        if self.is_preview_image {
            vec![
                ("Content-Disposition", "inline"),
                ("X-Content-Type-Options", "nosniff"),
                ("X-Frame-Options", "SAMEORIGIN"),
                ("Cache-Control", "public, max-age=3600"),
            ]
        } else {
            vec![("Cache-Control", "private, max-age=3600")]
        }
    }
}

/// Infer a content type from the file extension alone.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn has_image_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Per-request resolver over a fixed asset root.
#[derive(Clone)]
pub struct DeliveryResolver {
    base_path: PathBuf,
}

impl DeliveryResolver {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        DeliveryResolver {
            base_path: base_path.into(),
        }
    }

    /// Resolve `requested` (a path relative to the asset root) to a servable
    /// file.
    ///
    /// Rejects traversal before touching the filesystem, then canonicalizes
    /// and enforces containment. For preview images, a `watermarked` sibling
    /// is preferred when present; a missing sibling is an expected condition,
    /// not an error.
    pub async fn resolve(&self, requested: &str) -> StorageResult<ResolvedFile> {
        if requested.contains("..") || requested.starts_with('/') || requested.contains('\\') {
            tracing::warn!(path = %requested, "Rejected suspicious delivery path");
            return Err(StorageError::PathViolation(requested.to_string()));
        }

        let base_canonical = fs::canonicalize(&self.base_path).await.map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize asset root: {}", e))
        })?;

        let canonical = self.canonicalize_contained(requested, &base_canonical).await?;

        let segments: Vec<&str> = requested.split('/').collect();
        let is_preview = segments.contains(&PREVIEW_SEGMENT);
        let already_watermarked = segments.contains(&WATERMARK_SEGMENT);
        let is_preview_image = is_preview && has_image_extension(requested);

        let mut path = canonical;
        let mut watermarked = already_watermarked;

        if is_preview_image && !already_watermarked {
            if let Some(candidate) = watermarked_sibling(requested) {
                match self.canonicalize_contained(&candidate, &base_canonical).await {
                    Ok(candidate_path) => {
                        tracing::debug!(path = %candidate, "Serving watermarked preview");
                        path = candidate_path;
                        watermarked = true;
                    }
                    Err(StorageError::NotFound(_)) => {
                        tracing::debug!(
                            path = %requested,
                            "No watermarked sibling, serving original preview"
                        );
                    }
                    Err(other) => return Err(other),
                }
            }
        }

        Ok(ResolvedFile {
            content_type: content_type_for(&path),
            path,
            is_preview_image,
            watermarked,
        })
    }

    /// Canonicalize a relative path and require it to stay under the root.
    async fn canonicalize_contained(
        &self,
        relative: &str,
        base_canonical: &Path,
    ) -> StorageResult<PathBuf> {
        let joined = self.base_path.join(relative);

        let canonical = match fs::canonicalize(&joined).await {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(relative.to_string()));
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };

        if !canonical.starts_with(base_canonical) {
            tracing::warn!(
                path = %relative,
                resolved = %canonical.display(),
                "Delivery path escapes asset root"
            );
            return Err(StorageError::PathViolation(relative.to_string()));
        }

        Ok(canonical)
    }
}

/// Insert the `watermarked` segment after `preview` in a relative path.
fn watermarked_sibling(requested: &str) -> Option<String> {
    let segments: Vec<&str> = requested.split('/').collect();
    let preview_idx = segments.iter().position(|s| *s == PREVIEW_SEGMENT)?;

    let mut candidate = segments[..=preview_idx].to_vec();
    candidate.push(WATERMARK_SEGMENT);
    candidate.extend_from_slice(&segments[preview_idx + 1..]);
    Some(candidate.join("/"))
}
