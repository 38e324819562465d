mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{body_json, TestApp};
use pos_backoffice_api::{build_router, middleware_helpers::request_id::REQUEST_ID_HEADER};
use tower::ServiceExt;

#[tokio::test]
async fn health_endpoints_report_up() {
    let app = TestApp::new().await;

    let health = app.request(Method::GET, "/health", None).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await["status"], "up");

    let live = app.request(Method::GET, "/health/live", None).await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(body_json(live).await["alive"], true);

    let ready = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(ready.status(), StatusCode::OK);
    let json = body_json(ready).await;
    assert_eq!(json["ready"], true);
    assert_eq!(json["details"]["database"], "up");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/products", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(!header.is_empty());

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 0);
    assert_eq!(json["meta"]["request_id"], header.as_str());
}

#[tokio::test]
async fn inbound_request_id_is_echoed_in_errors() {
    let app = TestApp::new().await;
    let router = build_router(app.state.clone());

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/v1/vendors/12345")
                .header(REQUEST_ID_HEADER, "till-3-0007")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "till-3-0007"
    );
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "not_found");
    assert_eq!(json["request_id"], "till-3-0007");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["info"]["title"], "POS Back Office API");
    assert!(json["paths"].get("/api/v1/invoices/{id}").is_some());
}
