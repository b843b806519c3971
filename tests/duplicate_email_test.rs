use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_duplicate_email_under_normalization_conflicts() {
    let app = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/users")
        .json(&common::create_test_user_json("jane@example.com", "Jane"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    for email in ["JANE@example.com", "  jane@EXAMPLE.com  "] {
        let response = server
            .post("/users")
            .json(&common::create_test_user_json(email, "Another Jane"))
            .await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["message"], "user already exists");
    }

    let count: Value = server.get("/users/count").await.json();
    assert_eq!(count["count"], 1);
}

#[tokio::test]
async fn test_update_email_conflicts_only_with_other_users() {
    let app = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    let jane: Value = server
        .post("/users")
        .json(&common::create_test_user_json("jane@example.com", "Jane"))
        .await
        .json();
    server
        .post("/users")
        .json(&common::create_test_user_json("john@example.com", "John"))
        .await;
    let jane_path = format!("/users/{}", jane["id"].as_str().unwrap());

    // own address in another spelling
    let response = server
        .patch(&jane_path)
        .json(&json!({"email": "Jane@Example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["email"], "jane@example.com");

    let response = server
        .patch(&jane_path)
        .json(&json!({"email": " JOHN@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "Email already in use");

    let fetched: Value = server.get(&jane_path).await.json();
    assert_eq!(fetched["email"], "jane@example.com");
}
