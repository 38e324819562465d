#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use pos_backoffice_api::{
    build_router,
    config::{AppConfig, StorageConfig},
    db::{self, DbConfig},
    entities::{company, item_category, product, tax, vendor_customer, warehouse, PartyType},
    storage::{MemoryObjectStore, SharedObjectStore},
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "pos-test-boundary";

/// Application backed by a private in-memory SQLite database and an
/// in-memory object store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub store: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.storage = StorageConfig::memory();

        let store = Arc::new(MemoryObjectStore::new());
        let shared: SharedObjectStore = store.clone();
        let state = AppState::new(Arc::new(pool), cfg, shared);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// Sends a request with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    /// Sends a raw JSON text body, for malformed-input cases.
    pub async fn request_raw_json(&self, method: Method, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request");
        self.send(request).await
    }

    /// Sends a `multipart/form-data` request. Files are `(field, file name, bytes)`.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Response {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, file_name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("failed to build multipart request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_company(&self, name: &str) -> company::Model {
        company::ActiveModel {
            name: Set(name.to_string()),
            email: Set(Some(format!("{}@example.com", name.to_lowercase()))),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed company")
    }

    pub async fn seed_warehouse(&self, company_id: i32, name: &str) -> warehouse::Model {
        warehouse::ActiveModel {
            company_id: Set(company_id),
            warehouse_name: Set(name.to_string()),
            location: Set(Some("Dock 4".to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed warehouse")
    }

    pub async fn seed_category(&self, company_id: i32, name: &str) -> item_category::Model {
        item_category::ActiveModel {
            company_id: Set(company_id),
            item_category_name: Set(name.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed item category")
    }

    pub async fn seed_tax(&self, company_id: i32, class: &str, value: Decimal) -> tax::Model {
        tax::ActiveModel {
            company_id: Set(company_id),
            tax_class: Set(class.to_string()),
            tax_value: Set(value),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed tax")
    }

    pub async fn seed_customer(&self, company_id: i32, name: &str) -> vendor_customer::Model {
        let now = Utc::now();
        vendor_customer::ActiveModel {
            company_id: Set(company_id),
            name_english: Set(name.to_string()),
            email: Set(Some(format!("{}@example.com", name.to_lowercase()))),
            phone: Set(Some("+971500000001".to_string())),
            address: Set(Some("12 Market Street".to_string())),
            party_type: Set(PartyType::Customer),
            account_balance: Set(Decimal::ZERO),
            credit_period_days: Set(0),
            enable_gst: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed customer")
    }

    pub async fn seed_product(&self, company_id: i32, name: &str) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            company_id: Set(company_id),
            item_name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed product")
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
