use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "POS Back Office API",
        version = "0.1.0",
        description = r#"
# POS Back Office API

Invoices, products and vendor/customer records for point-of-sale companies.

## Conventions

- Every response is wrapped in an envelope: `{"success": true, "message": "...", "count": 3, "data": ...}`
- Ids and amounts may be sent as JSON numbers or numeric strings
- Products and vendors are created and updated with `multipart/form-data`; only the fields sent are changed
- Sending `products` on an invoice update replaces every line item of that invoice

## Errors

```json
{
  "success": false,
  "message": "Failed to create invoice",
  "code": "database_error",
  "error": "Database error: ...",
  "request_id": "6f1c..."
}
```

`error` is only present on 5xx responses. `code` is one of `validation_error`, `not_found`,
`database_error`, `storage_error` or `internal_error`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "invoices", description = "POS invoices and their line items"),
        (name = "products", description = "Product catalogue with images"),
        (name = "vendors", description = "Vendors and customers with attached documents")
    ),
    paths(
        // Invoices
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::list_company_invoices,
        crate::handlers::invoices::invoice_summary,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::update_invoice,
        crate::handlers::invoices::delete_invoice,

        // Products
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::list_company_products,
        crate::handlers::products::list_warehouse_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Vendors
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::list_company_vendors,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,

            // Invoice types
            crate::services::invoices::CreateInvoiceRequest,
            crate::services::invoices::UpdateInvoiceRequest,
            crate::services::invoices::InvoiceLineRequest,
            crate::services::invoices::InvoiceView,
            crate::services::invoices::InvoiceLineView,
            crate::services::invoices::InvoiceCustomer,
            crate::services::invoices::InvoiceTax,
            crate::services::invoices::InvoiceSummary,
            crate::entities::pos_invoice::Model,
            crate::entities::PaymentStatus,

            // Product types
            crate::services::products::ProductView,
            crate::services::products::WarehouseRef,
            crate::services::products::CategoryRef,
            crate::entities::product::Model,

            // Vendor types
            crate::services::vendors::VendorView,
            crate::services::vendors::CompanyRef,
            crate::entities::vendor_customer::Model,
            crate::entities::PartyType,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_resource() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("POS Back Office API"));
        assert!(json.contains("/api/v1/invoices/summary"));
        assert!(json.contains("/api/v1/products/company/{company_id}/warehouse/{warehouse_id}"));
        assert!(json.contains("/api/v1/vendors/{id}"));
        assert!(json.contains("InvoiceSummary"));
    }
}
