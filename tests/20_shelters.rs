mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn create_returns_stored_record() -> Result<()> {
    let app = TestApp::new().await?;
    let (status, body) = app
        .post_json(
            "/api/shelters",
            &json!({
                "name": "Happy Paws",
                "location": "Springfield",
                "contactEmail": "hello@paws.org",
                "ignored": true
            }),
        )
        .await?;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["name"], "Happy Paws");
    assert_eq!(body["contactEmail"], "hello@paws.org");
    assert!(body.get("contactPhone").is_none());
    assert!(body.get("ignored").is_none());
    assert!(body["_id"].is_string());
    assert!(body["createdAt"].is_string());
    assert_eq!(body["createdAt"], body["updatedAt"]);
    Ok(())
}

#[tokio::test]
async fn create_requires_name_and_location() -> Result<()> {
    let app = TestApp::new().await?;
    let (status, body) = app.post_json("/api/shelters", &json!({ "name": "" })).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Shelter validation failed: name: is required, location: is required"
    );
    assert!(app.state.shelters.find_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn list_returns_all_in_creation_order() -> Result<()> {
    let app = TestApp::new().await?;
    let (_, empty) = app.get("/api/shelters").await?;
    assert_eq!(empty, json!([]));

    app.create_shelter("First").await?;
    app.create_shelter("Second").await?;

    let (status, body) = app.get("/api/shelters").await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["First", "Second"]);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_client_error() -> Result<()> {
    let app = TestApp::new().await?;
    let request = Request::post("/api/shelters")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;

    let (status, body) = app.send_for_json(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_reports_ok_and_cors_is_open() -> Result<()> {
    let app = TestApp::new().await?;
    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let request = Request::get("/api/shelters")
        .header(header::ORIGIN, "http://frontend.example")
        .body(Body::empty())?;
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await?;
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    Ok(())
}
