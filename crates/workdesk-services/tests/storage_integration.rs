//! Integration tests for ObjectStorage using wiremock.

use std::sync::Arc;

use workdesk_core::ValidationError;
use workdesk_services::{BackendClient, ObjectStorage, ServiceError, UploadFile};
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn storage(server: &MockServer) -> ObjectStorage {
    let backend = Arc::new(BackendClient::new(&server.uri(), "anon"));
    ObjectStorage::new(backend, "meetsupas", "avatars")
}

fn png(name: &str, size: usize) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0u8; size],
    }
}

#[tokio::test]
async fn test_upload_avatar_creates_new_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/meetsupas/avatars/user-42-\d+\.png$"))
        .and(header("x-upsert", "false"))
        .and(header("Authorization", "Bearer access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Key": "meetsupas/avatars/user-42-1.png"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = storage(&mock_server)
        .upload_avatar("user-42", png("me.png", 128), Some("access"))
        .await
        .unwrap();

    assert!(result.path.starts_with("avatars/user-42-"));
    assert!(result.path.ends_with(".png"));
    assert_eq!(
        result.url,
        format!(
            "{}/storage/v1/object/public/meetsupas/{}",
            mock_server.uri(),
            result.path
        )
    );
}

#[tokio::test]
async fn test_upload_avatar_rejects_large_file_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = storage(&mock_server)
        .upload_avatar("u", png("big.png", 6 * 1024 * 1024), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::FileTooLarge { .. })
    ));
}

#[tokio::test]
async fn test_upload_error_carries_backend_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "statusCode": "409",
            "error": "Duplicate",
            "message": "The resource already exists"
        })))
        .mount(&mock_server)
        .await;

    let err = storage(&mock_server)
        .upload_file("docs", png("a.png", 4), None)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "The resource already exists");
}

#[tokio::test]
async fn test_remove_sends_prefixes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/meetsupas"))
        .and(body_json(serde_json::json!({ "prefixes": ["avatars/old.png"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    storage(&mock_server)
        .remove(&["avatars/old.png".to_string()], None)
        .await
        .unwrap();
}
