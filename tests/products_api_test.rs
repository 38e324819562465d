mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use pos_backoffice_api::{
    entities::product,
    storage::{ObjectStore, StoreCall},
};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

async fn create_with_image(app: &TestApp, company_id: i32, warehouse_id: i32) -> Value {
    let company = company_id.to_string();
    let warehouse = warehouse_id.to_string();
    let response = app
        .multipart(
            Method::POST,
            "/api/v1/products",
            &[
                ("company_id", company.as_str()),
                ("warehouse_id", warehouse.as_str()),
                ("item_name", "Flat White"),
                ("sale_price", "4.20"),
                ("sku", "FW-01"),
            ],
            &[("image", "flat-white.png", PNG)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn create_product_uploads_image() {
    let app = TestApp::new().await;
    let company = app.seed_company("Roastery").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;

    let body = create_with_image(&app, company.id, warehouse.id).await;

    assert_eq!(body["message"], "Product created successfully");
    let data = &body["data"];
    assert_eq!(data["item_name"], "Flat White");
    assert_eq!(data["sale_price"].as_f64(), Some(4.2));
    assert_eq!(data["warehouse"]["warehouse_name"], "Main");

    let image = data["image"].as_str().unwrap();
    assert!(image.starts_with("memory://products/"));
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn create_product_requires_company_and_name() {
    let app = TestApp::new().await;
    let company = app.seed_company("Roastery").await;
    let company_id = company.id.to_string();

    let response = app
        .multipart(
            Method::POST,
            "/api/v1/products",
            &[("company_id", company_id.as_str()), ("item_name", "   ")],
            &[("image", "x.png", PNG)],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "company_id and item_name are required"
    );
    assert!(app.store.is_empty());
    assert_eq!(product::Entity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_insert_discards_uploaded_image() {
    let app = TestApp::new().await;

    // company 99 does not exist, so the insert violates the foreign key
    let response = app
        .multipart(
            Method::POST,
            "/api/v1/products",
            &[("company_id", "99"), ("item_name", "Ghost")],
            &[("image", "ghost.png", PNG)],
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.is_empty());
    assert_eq!(app.store.deletes().len(), 1);
}

#[tokio::test]
async fn list_filters_by_company_and_warehouse() {
    let app = TestApp::new().await;
    let acme = app.seed_company("Acme").await;
    let other = app.seed_company("Other").await;
    let front = app.seed_warehouse(acme.id, "Front").await;
    let back = app.seed_warehouse(acme.id, "Back").await;

    create_with_image(&app, acme.id, front.id).await;
    create_with_image(&app, acme.id, back.id).await;
    app.seed_product(other.id, "Tea").await;

    let all = body_json(app.request(Method::GET, "/api/v1/products", None).await).await;
    assert_eq!(all["count"], 3);

    let company = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/products/company/{}", acme.id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(company["count"], 2);

    let warehouse = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/products/company/{}/warehouse/{}", acme.id, back.id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(warehouse["count"], 1);
    assert_eq!(warehouse["data"][0]["warehouse"]["warehouse_name"], "Back");
}

#[tokio::test]
async fn get_missing_product_is_404() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/products/31337", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Product not found");
}

#[tokio::test]
async fn update_replaces_image_and_removes_old_one() {
    let app = TestApp::new().await;
    let company = app.seed_company("Roastery").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;
    let created = create_with_image(&app, company.id, warehouse.id).await;
    let id = created["data"]["id"].as_i64().unwrap();
    let old_image = created["data"]["image"].as_str().unwrap().to_string();

    let response = app
        .multipart(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            &[("item_name", "Cortado"), ("sku", "")],
            &[("image", "cortado.png", PNG)],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Product updated successfully");
    let data = &json["data"];
    assert_eq!(data["item_name"], "Cortado");
    // blank fields are left alone
    assert_eq!(data["sku"], "FW-01");
    assert_eq!(data["sale_price"].as_f64(), Some(4.2));

    let new_image = data["image"].as_str().unwrap();
    assert_ne!(new_image, old_image);
    assert_eq!(app.store.len(), 1);
    assert_eq!(
        app.store.deletes(),
        vec![old_image.trim_start_matches("memory://").to_string()]
    );
}

#[tokio::test]
async fn update_without_image_keeps_blob() {
    let app = TestApp::new().await;
    let company = app.seed_company("Roastery").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;
    let created = create_with_image(&app, company.id, warehouse.id).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .multipart(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            &[("discount", "0.5")],
            &[],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["discount"].as_f64(), Some(0.5));
    assert_eq!(data["image"], created["data"]["image"]);
    assert!(app.store.deletes().is_empty());
}

#[tokio::test]
async fn delete_removes_image_then_row() {
    let app = TestApp::new().await;
    let company = app.seed_company("Roastery").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;
    let created = create_with_image(&app, company.id, warehouse.id).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Product deleted successfully"
    );
    assert!(app.store.is_empty());
    assert!(matches!(
        app.store.calls().last(),
        Some(StoreCall::Delete { .. })
    ));
    assert_eq!(product::Entity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_keeps_row_when_image_delete_fails() {
    let app = TestApp::new().await;
    let company = app.seed_company("Roastery").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;
    let created = create_with_image(&app, company.id, warehouse.id).await;
    let id = created["data"]["id"].as_i64().unwrap();
    app.store.fail_deletes(true);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "storage_error");
    assert_eq!(product::Entity::find().count(app.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn delete_succeeds_when_image_already_gone() {
    let app = TestApp::new().await;
    let company = app.seed_company("Roastery").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;
    let created = create_with_image(&app, company.id, warehouse.id).await;
    let id = created["data"]["id"].as_i64().unwrap();
    let image = created["data"]["image"].as_str().unwrap();

    app.store.delete_url(image).await.unwrap();
    assert!(app.store.is_empty());

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(product::Entity::find().count(app.db()).await.unwrap(), 0);
}
