//! Test helpers: build the full router over an in-memory store and a
//! temp-dir vault, so tests exercise real routes without Postgres.

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestRequest, TestServer};
use designmart_api::state::AppState;
use designmart_core::Config;
use designmart_db::memory::InMemoryDesignStore;
use designmart_db::DesignStore;
use designmart_storage::DesignVault;
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryDesignStore>,
    pub temp_dir: TempDir,
}

impl TestApp {
    /// Absolute path of the asset root backing this app's vault.
    pub fn asset_root(&self) -> std::path::PathBuf {
        self.temp_dir.path().to_path_buf()
    }
}

fn test_config(asset_root: &str) -> Config {
    Config {
        server_port: 0,
        database_url: "postgres://unused-in-tests".to_string(),
        asset_root: asset_root.to_string(),
        public_base_url: "http://localhost:8080".to_string(),
        cors_origins: Vec::new(),
        preview_max_file_size: 5 * 1024 * 1024,
        raw_max_file_size: 50 * 1024 * 1024,
        max_request_body_size: 256 * 1024 * 1024,
        db_max_connections: 5,
        db_timeout_seconds: 5,
        file_write_timeout_secs: 30,
        environment: "test".to_string(),
    }
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let asset_root = temp_dir.path().to_str().expect("non-utf8 temp dir");

    let store = Arc::new(InMemoryDesignStore::new());
    let dyn_store: Arc<dyn DesignStore> = store.clone();

    let vault = DesignVault::new(asset_root)
        .await
        .expect("Failed to create vault");

    let state = Arc::new(AppState::new(test_config(asset_root), dyn_store, vault));
    let router = designmart_api::setup::build_router(state);
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        store,
        temp_dir,
    }
}

/// Attach gateway identity headers for an approved designer.
pub fn as_designer(request: TestRequest, user_id: Uuid) -> TestRequest {
    request
        .add_header("x-user-id", user_id.to_string())
        .add_header("x-user-role", "designer")
        .add_header("x-user-email", "designer@example.com")
        .add_header("x-user-approved", "true")
}

/// Designer whose account has not been approved for selling yet.
pub fn as_unapproved_designer(request: TestRequest, user_id: Uuid) -> TestRequest {
    request
        .add_header("x-user-id", user_id.to_string())
        .add_header("x-user-role", "designer")
        .add_header("x-user-email", "newbie@example.com")
        .add_header("x-user-approved", "false")
}

pub fn as_admin(request: TestRequest, user_id: Uuid) -> TestRequest {
    request
        .add_header("x-user-id", user_id.to_string())
        .add_header("x-user-role", "admin")
        .add_header("x-user-email", "admin@example.com")
        .add_header("x-user-approved", "true")
}

pub fn as_buyer(request: TestRequest, user_id: Uuid) -> TestRequest {
    request
        .add_header("x-user-id", user_id.to_string())
        .add_header("x-user-role", "buyer")
        .add_header("x-user-email", "buyer@example.com")
        .add_header("x-user-approved", "true")
}

/// A complete, valid upload form: one PNG preview and one PSD raw file.
pub fn valid_upload_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("title", "Mountain Logo")
        .add_text("description", "A minimalist mountain logo")
        .add_text("category", "logos")
        .add_text("tags", "mountain, outdoors, minimal")
        .add_part(
            "previewImage",
            Part::bytes(fake_png().to_vec())
                .file_name("preview.png")
                .mime_type("image/png"),
        )
        .add_part(
            "rawFiles",
            Part::bytes(b"psd-bytes".to_vec())
                .file_name("logo.psd")
                .mime_type("image/vnd.adobe.photoshop"),
        )
}

pub fn fake_png() -> &'static [u8] {
    // PNG magic followed by filler; content is never decoded.
    &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4]
}
