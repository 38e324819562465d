use bytes::Bytes;
use pos_backoffice_api::storage::{CloudinaryStore, ObjectStore, StorageError};
use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn store(server: &MockServer) -> CloudinaryStore {
    CloudinaryStore::new(server.uri(), "demo", "key-123", "secret-xyz")
}

#[tokio::test]
async fn upload_posts_signed_multipart_and_returns_secure_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/auto/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "products/abc",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/products/abc.png",
            "url": "http://res.cloudinary.com/demo/image/upload/v1/products/abc.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = store(&server)
        .upload(Bytes::from_static(b"png-bytes"), "products")
        .await
        .unwrap();

    assert_eq!(
        url,
        "https://res.cloudinary.com/demo/image/upload/v1/products/abc.png"
    );

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(body.contains("name=\"api_key\""));
    assert!(body.contains("key-123"));
    assert!(body.contains("name=\"signature\""));
    assert!(body.contains("name=\"folder\""));
    assert!(body.contains("png-bytes"));
    assert!(!body.contains("secret-xyz"));
}

#[tokio::test]
async fn upload_error_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/auto/upload"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid Signature"}
        })))
        .mount(&server)
        .await;

    let err = store(&server)
        .upload(Bytes::from_static(b"x"), "products")
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Rejected(msg) if msg == "Invalid Signature"));
}

#[tokio::test]
async fn delete_url_destroys_by_public_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/destroy"))
        .and(body_string_contains("public_id=vendorsCustomer%2Ffiles%2Fabc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .delete_url(
            "https://res.cloudinary.com/demo/image/upload/v1712345678/vendorsCustomer/files/abc123.pdf",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn raw_delivery_urls_destroy_raw_resources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/raw/destroy"))
        .and(body_string_contains("public_id=vendorsCustomer%2Ffiles%2Fabc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/destroy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .expect(0)
        .mount(&server)
        .await;

    store(&server)
        .delete_url("https://res.cloudinary.com/demo/raw/upload/v1/vendorsCustomer/files/abc.pdf")
        .await
        .unwrap();
}

#[tokio::test]
async fn destroy_of_absent_object_is_ok_by_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/destroy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "not found"})))
        .mount(&server)
        .await;

    let store = store(&server);
    assert!(matches!(
        store.delete("products/gone").await,
        Err(StorageError::NotFound(id)) if id == "products/gone"
    ));
    store
        .delete_url("https://res.cloudinary.com/demo/image/upload/v1/products/gone.png")
        .await
        .unwrap();
}

#[tokio::test]
async fn unexpected_destroy_result_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/destroy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "pending"})))
        .mount(&server)
        .await;

    let err = store(&server).delete("products/abc").await.unwrap_err();
    assert!(matches!(err, StorageError::Rejected(_)));
}

#[tokio::test]
async fn foreign_urls_are_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    store(&server)
        .delete_url("https://example.com/images/abc.png")
        .await
        .unwrap();
}
