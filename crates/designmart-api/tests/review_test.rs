mod helpers;

use designmart_db::DesignStore;
use helpers::{as_admin, as_designer, setup_test_app, valid_upload_form, TestApp};
use uuid::Uuid;

async fn upload_one(app: &TestApp, designer: Uuid) -> Uuid {
    let response = as_designer(app.server.post("/api/v0/designs"), designer)
        .multipart(valid_upload_form())
        .await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    body["design"]["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_pending_queue_requires_admin() {
    let app = setup_test_app().await;

    let response = as_designer(app.server.get("/api/v0/designs/pending"), Uuid::new_v4()).await;

    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_pending_queue_lists_uploads_with_absolute_preview_url() {
    let app = setup_test_app().await;
    let designer = Uuid::new_v4();
    app.store.register_uploader(designer, "maker@example.com");
    let id = upload_one(&app, designer).await;

    let response = as_admin(app.server.get("/api/v0/designs/pending"), Uuid::new_v4()).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    let designs = body["designs"].as_array().unwrap();
    assert_eq!(designs.len(), 1);
    assert_eq!(designs[0]["id"], id.to_string());
    assert_eq!(designs[0]["uploadedBy"]["email"], "maker@example.com");

    let url = designs[0]["previewImageUrl"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8080/uploads/designs/"));
    assert!(url.contains(&id.to_string()));
}

#[tokio::test]
async fn test_approve_design() {
    let app = setup_test_app().await;
    let id = upload_one(&app, Uuid::new_v4()).await;
    let admin = Uuid::new_v4();

    let response = as_admin(
        app.server.post(&format!("/api/v0/designs/{}/decision", id)),
        admin,
    )
    .json(&serde_json::json!({ "decision": "approve" }))
    .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["design"]["state"], "approved");

    let design = app.store.get(id).await.unwrap().unwrap();
    assert_eq!(design.reviewed_by, Some(admin));
    assert!(design.reviewed_at.is_some());
}

#[tokio::test]
async fn test_double_decision_conflicts() {
    let app = setup_test_app().await;
    let id = upload_one(&app, Uuid::new_v4()).await;

    let first = as_admin(
        app.server.post(&format!("/api/v0/designs/{}/decision", id)),
        Uuid::new_v4(),
    )
    .json(&serde_json::json!({ "decision": "reject" }))
    .await;
    assert_eq!(first.status_code(), 200);

    let second = as_admin(
        app.server.post(&format!("/api/v0/designs/{}/decision", id)),
        Uuid::new_v4(),
    )
    .json(&serde_json::json!({ "decision": "approve" }))
    .await;

    assert_eq!(second.status_code(), 409);
    let body: serde_json::Value = second.json();
    assert_eq!(body["code"], "INVALID_TRANSITION");

    // The rejection stands.
    let design = app.store.get(id).await.unwrap().unwrap();
    assert_eq!(design.state.as_str(), "rejected");
}

#[tokio::test]
async fn test_unknown_decision_value_rejected() {
    let app = setup_test_app().await;
    let id = upload_one(&app, Uuid::new_v4()).await;

    let response = as_admin(
        app.server.post(&format!("/api/v0/designs/{}/decision", id)),
        Uuid::new_v4(),
    )
    .json(&serde_json::json!({ "decision": "maybe" }))
    .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_decision_on_missing_design_is_404() {
    let app = setup_test_app().await;

    let response = as_admin(
        app.server
            .post(&format!("/api/v0/designs/{}/decision", Uuid::new_v4())),
        Uuid::new_v4(),
    )
    .json(&serde_json::json!({ "decision": "approve" }))
    .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_admin_delete_removes_record_and_files() {
    let app = setup_test_app().await;
    let id = upload_one(&app, Uuid::new_v4()).await;
    let subtree = app.asset_root().join("designs").join(id.to_string());
    assert!(subtree.exists());

    let response = as_admin(
        app.server.delete(&format!("/api/v0/designs/{}", id)),
        Uuid::new_v4(),
    )
    .await;

    assert_eq!(response.status_code(), 200);
    assert!(app.store.get(id).await.unwrap().is_none());
    assert!(!subtree.exists());
}

#[tokio::test]
async fn test_delete_requires_admin() {
    let app = setup_test_app().await;
    let designer = Uuid::new_v4();
    let id = upload_one(&app, designer).await;

    // Even the owner cannot delete through the admin route.
    let response = as_designer(
        app.server.delete(&format!("/api/v0/designs/{}", id)),
        designer,
    )
    .await;

    assert_eq!(response.status_code(), 403);
    assert!(app.store.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_missing_design_is_404() {
    let app = setup_test_app().await;

    let response = as_admin(
        app.server
            .delete(&format!("/api/v0/designs/{}", Uuid::new_v4())),
        Uuid::new_v4(),
    )
    .await;

    assert_eq!(response.status_code(), 404);
}
