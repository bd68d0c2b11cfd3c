mod helpers;

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
async fn test_listing_is_scoped_to_the_caller() {
    let app = setup_test_app().await;
    let mine = Uuid::new_v4();
    let someone_else = Uuid::new_v4();
    let my_id = upload_one(&app, mine).await;
    upload_one(&app, someone_else).await;

    let response = as_designer(app.server.get("/api/v0/designs/mine"), mine).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let designs = body["designs"].as_array().unwrap();
    assert_eq!(designs.len(), 1);
    assert_eq!(designs[0]["id"], my_id.to_string());
    assert!(designs[0]["previewImageUrl"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:8080/uploads/"));

    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["stats"]["total"], 1);
    assert_eq!(body["stats"]["pending"], 1);
}

#[tokio::test]
async fn test_status_filter_and_stats() {
    let app = setup_test_app().await;
    let designer = Uuid::new_v4();
    let first = upload_one(&app, designer).await;
    upload_one(&app, designer).await;

    // Approve one of the two.
    let approve = as_admin(
        app.server
            .post(&format!("/api/v0/designs/{}/decision", first)),
        Uuid::new_v4(),
    )
    .json(&serde_json::json!({ "decision": "approve" }))
    .await;
    assert_eq!(approve.status_code(), 200);

    let response = as_designer(app.server.get("/api/v0/designs/mine"), designer)
        .add_query_param("status", "approved")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["designs"].as_array().unwrap().len(), 1);
    assert_eq!(body["designs"][0]["id"], first.to_string());

    // Stats always cover all states, regardless of the filter.
    assert_eq!(body["stats"]["total"], 2);
    assert_eq!(body["stats"]["approved"], 1);
    assert_eq!(body["stats"]["pending"], 1);
}

#[tokio::test]
async fn test_pagination_pages_through() {
    let app = setup_test_app().await;
    let designer = Uuid::new_v4();
    for _ in 0..3 {
        upload_one(&app, designer).await;
    }

    let response = as_designer(app.server.get("/api/v0/designs/mine"), designer)
        .add_query_param("page", "2")
        .add_query_param("limit", "2")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["designs"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], true);
}

#[tokio::test]
async fn test_unknown_sort_rejected() {
    let app = setup_test_app().await;

    let response = as_designer(app.server.get("/api/v0/designs/mine"), Uuid::new_v4())
        .add_query_param("sortBy", "sideways")
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_unknown_status_rejected() {
    let app = setup_test_app().await;

    let response = as_designer(app.server.get("/api/v0/designs/mine"), Uuid::new_v4())
        .add_query_param("status", "archived")
        .await;

    assert_eq!(response.status_code(), 400);
}
