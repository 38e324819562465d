//! POS Back Office API Library
//!
//! Invoices, products and vendor/customer records for point-of-sale
//! companies, served over axum and persisted with sea-orm.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod tracing;

use axum::{extract::DefaultBodyLimit, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        store: storage::SharedObjectStore,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), store);
        Self {
            db,
            config,
            services,
        }
    }

    pub fn invoice_service(&self) -> Arc<services::InvoiceService> {
        self.services.invoices.clone()
    }

    pub fn product_service(&self) -> Arc<services::ProductService> {
        self.services.products.clone()
    }

    pub fn vendor_service(&self) -> Arc<services::VendorService> {
        self.services.vendors.clone()
    }
}

/// Success envelope: `{success, message?, count?, data?}`
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Number of items in `data`, for list endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn envelope_omits_unset_fields() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2]).with_count(2)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 2);
        assert!(json.get("message").is_none());

        let json = serde_json::to_value(ApiResponse::success(()).with_message("done")).unwrap();
        assert_eq!(json["message"], "done");
        assert!(json.get("count").is_none());
    }
}

/// Resource routers, mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/invoices", handlers::invoices::invoice_routes())
        .nest("/products", handlers::products::product_routes())
        .nest("/vendors", handlers::vendors::vendor_routes())
}

/// The full application minus CORS and compression, which `main` adds.
///
/// Carries request-id propagation, HTTP tracing, the body size limit, the
/// health endpoints and Swagger UI.
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;
    let health = health::health_routes_with_state(state.db.clone());

    Router::new()
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
        .nest("/health", health)
        .merge(openapi::swagger_ui())
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
}
