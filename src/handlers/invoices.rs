use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    entities::pos_invoice,
    errors::ApiError,
    handlers::{
        common::{created_response, parse_id, success_response},
        forms::ValidatedJson,
    },
    services::invoices::{CreateInvoiceRequest, InvoiceSummary, InvoiceView, UpdateInvoiceRequest},
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Company to summarise
    pub company_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = ApiResponse<InvoiceView>),
        (status = 400, description = "Missing required fields", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to create invoice", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateInvoiceRequest>,
) -> Result<Response, ApiError> {
    let invoice = state
        .invoice_service()
        .create_invoice(payload)
        .await
        .map_err(|e| ApiError::operation("Failed to create invoice", e))?;

    Ok(created_response(
        ApiResponse::success(invoice).with_message("Invoice created successfully"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/company/{company_id}",
    params(("company_id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Invoices for the company, newest first", body = ApiResponse<Vec<InvoiceView>>),
        (status = 404, description = "Company has no invoices", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn list_company_invoices(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Response, ApiError> {
    let company_id = parse_id(&company_id, "company_id")?;
    let invoices = state
        .invoice_service()
        .list_company_invoices(company_id)
        .await
        .map_err(|e| ApiError::operation("Failed to fetch invoices", e))?;

    if invoices.is_empty() {
        return Err(ApiError::NotFound(
            "No invoices found for this company".to_string(),
        ));
    }

    let count = invoices.len();
    Ok(success_response(
        ApiResponse::success(invoices).with_count(count),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Invoice totals for the company", body = ApiResponse<InvoiceSummary>),
        (status = 400, description = "company_id missing or invalid", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn invoice_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    let company_id = query
        .company_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| ApiError::BadRequest("company_id is required".to_string()))?;
    let company_id = parse_id(company_id, "company_id")?;

    let summary = state
        .invoice_service()
        .summary(company_id)
        .await
        .map_err(|e| ApiError::operation("Failed to fetch invoice summary", e))?;

    Ok(success_response(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice fetched", body = ApiResponse<InvoiceView>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let invoice = state
        .invoice_service()
        .get_invoice(id)
        .await
        .map_err(|e| ApiError::operation("Failed to fetch invoice", e))?;

    Ok(success_response(ApiResponse::success(invoice)))
}

#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated; a supplied products array replaces all lines", body = ApiResponse<InvoiceView>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateInvoiceRequest>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let invoice = state
        .invoice_service()
        .update_invoice(id, payload)
        .await
        .map_err(|e| ApiError::operation("Failed to update invoice", e))?;

    Ok(success_response(
        ApiResponse::success(invoice).with_message("Invoice updated successfully"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice and its lines deleted", body = ApiResponse<pos_invoice::Model>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let invoice = state
        .invoice_service()
        .delete_invoice(id)
        .await
        .map_err(|e| ApiError::operation("Failed to delete invoice", e))?;

    Ok(success_response(
        ApiResponse::success(invoice).with_message("Invoice deleted successfully"),
    ))
}

pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_invoice))
        .route("/summary", get(invoice_summary))
        .route("/company/:company_id", get(list_company_invoices))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}
