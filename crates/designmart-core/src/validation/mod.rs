//! Pure validation for incoming uploads. No I/O happens here; callers hand in
//! file metadata (name, declared content type, size) already read from the
//! request.

use std::path::Path;

use crate::error::AppError;
use crate::models::{RawFormat, MAX_TAGS};

/// Default size ceiling for preview images (5 MiB).
pub const PREVIEW_MAX_BYTES: usize = 5 * 1024 * 1024;
/// Default size ceiling per raw design file (50 MiB).
pub const RAW_MAX_BYTES: usize = 50 * 1024 * 1024;

/// Content types accepted for the preview image.
pub const PREVIEW_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Metadata view of one uploaded file.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: usize,
}

impl FileUpload {
    pub fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }
}

/// Validation failures for uploaded files and form fields.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid preview type: {content_type} (allowed: JPEG, PNG, WebP)")]
    InvalidPreviewType { content_type: String },

    #[error("Unsupported raw file type: {filename}")]
    UnsupportedRawType { filename: String },

    #[error("No raw design files provided")]
    NoRawFiles,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { size, max } => AppError::PayloadTooLarge(format!(
                "File size {} bytes exceeds maximum of {} bytes",
                size, max
            )),
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// Strip MIME parameters and lowercase (`image/JPEG; charset=x` -> `image/jpeg`).
fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Lowercased extension of a filename, if any.
fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Map a declared content type to a raw design format.
fn format_from_content_type(content_type: &str) -> Option<RawFormat> {
    match normalize_mime(content_type).as_str() {
        "image/vnd.adobe.photoshop" | "application/x-photoshop" | "application/photoshop" => {
            Some(RawFormat::Psd)
        }
        "application/pdf" => Some(RawFormat::Pdf),
        "application/postscript" | "application/illustrator" => Some(RawFormat::Ai),
        "image/svg+xml" => Some(RawFormat::Svg),
        "application/eps" | "image/x-eps" => Some(RawFormat::Eps),
        "application/x-cdr" | "application/coreldraw" => Some(RawFormat::Cdr),
        _ => None,
    }
}

/// Map a filename extension to a raw design format.
fn format_from_extension(filename: &str) -> Option<RawFormat> {
    match extension_of(filename)?.as_str() {
        "psd" => Some(RawFormat::Psd),
        "pdf" => Some(RawFormat::Pdf),
        "ai" => Some(RawFormat::Ai),
        "svg" => Some(RawFormat::Svg),
        "eps" => Some(RawFormat::Eps),
        "cdr" => Some(RawFormat::Cdr),
        _ => None,
    }
}

/// Classify a raw design file: declared content type first, filename
/// extension as fallback.
pub fn classify_raw(file: &FileUpload) -> Result<RawFormat, ValidationError> {
    format_from_content_type(&file.content_type)
        .or_else(|| format_from_extension(&file.original_name))
        .ok_or_else(|| ValidationError::UnsupportedRawType {
            filename: file.original_name.clone(),
        })
}

/// Bound checks for uploaded files, parameterized so limits stay configurable.
#[derive(Debug, Clone)]
pub struct AssetValidator {
    preview_max_bytes: usize,
    raw_max_bytes: usize,
}

impl Default for AssetValidator {
    fn default() -> Self {
        AssetValidator {
            preview_max_bytes: PREVIEW_MAX_BYTES,
            raw_max_bytes: RAW_MAX_BYTES,
        }
    }
}

impl AssetValidator {
    pub fn new(preview_max_bytes: usize, raw_max_bytes: usize) -> Self {
        AssetValidator {
            preview_max_bytes,
            raw_max_bytes,
        }
    }

    /// Validate the preview image: type allow-list and size ceiling.
    pub fn check_preview(&self, file: &FileUpload) -> Result<(), ValidationError> {
        if file.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        let normalized = normalize_mime(&file.content_type);
        if !PREVIEW_CONTENT_TYPES.contains(&normalized.as_str()) {
            return Err(ValidationError::InvalidPreviewType {
                content_type: file.content_type.clone(),
            });
        }
        if file.size_bytes > self.preview_max_bytes {
            return Err(ValidationError::FileTooLarge {
                size: file.size_bytes,
                max: self.preview_max_bytes,
            });
        }
        Ok(())
    }

    /// Validate one raw design file: classification and size ceiling.
    pub fn check_raw(&self, file: &FileUpload) -> Result<RawFormat, ValidationError> {
        let format = classify_raw(file)?;
        if file.size_bytes > self.raw_max_bytes {
            return Err(ValidationError::FileTooLarge {
                size: file.size_bytes,
                max: self.raw_max_bytes,
            });
        }
        Ok(format)
    }
}

/// Require a non-empty (after trim) text field.
pub fn require_field(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

/// Parse a comma-separated tag list: trim, drop empties, cap at [`MAX_TAGS`].
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}
