use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};

use crate::{
    entities::product,
    errors::ApiError,
    handlers::{
        common::{created_response, parse_id, success_response, validate_input},
        forms::UploadForm,
    },
    repositories::ProductFilter,
    services::products::{ProductFields, ProductView},
    ApiResponse, AppState,
};

/// Multipart field carrying the product image
const IMAGE_FIELD: &str = "image";

fn product_fields(form: &UploadForm) -> Result<ProductFields, ApiError> {
    let fields = ProductFields {
        company_id: form.i32("company_id")?,
        warehouse_id: form.i32("warehouse_id")?,
        item_category_id: form.i32("item_category_id")?,
        item_name: form.text("item_name"),
        unit_id: form.i32("unit_id")?,
        hsn: form.text("hsn"),
        barcode: form.text("barcode"),
        sku: form.text("sku"),
        description: form.text("description"),
        initial_qty: form.i32("initial_qty")?,
        min_order_qty: form.i32("min_order_qty")?,
        as_of_date: form.date("as_of_date")?,
        initial_cost: form.decimal("initial_cost")?,
        sale_price: form.decimal("sale_price")?,
        purchase_price: form.decimal("purchase_price")?,
        discount: form.decimal("discount")?,
        tax_account: form.text("tax_account"),
        remarks: form.text("remarks"),
    };
    validate_input(&fields)?;
    Ok(fields)
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body(content_type = "multipart/form-data", description = "Product fields plus an optional `image` file"),
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductView>),
        (status = 400, description = "company_id or item_name missing", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to create product", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<Response, ApiError> {
    let fields = product_fields(&form)?;
    let image = form.take_file(IMAGE_FIELD);

    let product = state
        .product_service()
        .create_product(fields, image)
        .await
        .map_err(|e| ApiError::operation("Failed to create product", e))?;

    Ok(created_response(
        ApiResponse::success(product).with_message("Product created successfully"),
    ))
}

async fn list_with(state: &AppState, filter: ProductFilter) -> Result<Response, ApiError> {
    let products = state
        .product_service()
        .list_products(filter)
        .await
        .map_err(|e| ApiError::operation("Failed to fetch products", e))?;

    let count = products.len();
    Ok(success_response(
        ApiResponse::success(products).with_count(count),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "All products with warehouse and category", body = ApiResponse<Vec<ProductView>>)
    ),
    tag = "products"
)]
pub async fn list_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    list_with(&state, ProductFilter::default()).await
}

#[utoipa::path(
    get,
    path = "/api/v1/products/company/{company_id}",
    params(("company_id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Products of the company", body = ApiResponse<Vec<ProductView>>)
    ),
    tag = "products"
)]
pub async fn list_company_products(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Response, ApiError> {
    let company_id = parse_id(&company_id, "company_id")?;
    list_with(&state, ProductFilter::company(company_id)).await
}

#[utoipa::path(
    get,
    path = "/api/v1/products/company/{company_id}/warehouse/{warehouse_id}",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
        ("warehouse_id" = i32, Path, description = "Warehouse ID")
    ),
    responses(
        (status = 200, description = "Products of the company stocked in the warehouse", body = ApiResponse<Vec<ProductView>>)
    ),
    tag = "products"
)]
pub async fn list_warehouse_products(
    State(state): State<AppState>,
    Path((company_id, warehouse_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let company_id = parse_id(&company_id, "company_id")?;
    let warehouse_id = parse_id(&warehouse_id, "warehouse_id")?;
    list_with(&state, ProductFilter::company_warehouse(company_id, warehouse_id)).await
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product fetched", body = ApiResponse<ProductView>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let product = state
        .product_service()
        .get_product(id)
        .await
        .map_err(|e| ApiError::operation("Failed to fetch product", e))?;

    Ok(success_response(ApiResponse::success(product)))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Fields to change plus an optional replacement `image`"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductView>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut form: UploadForm,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let fields = product_fields(&form)?;
    let image = form.take_file(IMAGE_FIELD);

    let product = state
        .product_service()
        .update_product(id, fields, image)
        .await
        .map_err(|e| ApiError::operation("Failed to update product", e))?;

    Ok(success_response(
        ApiResponse::success(product).with_message("Product updated successfully"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product and its image deleted", body = ApiResponse<product::Model>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Image or row deletion failed", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let product = state
        .product_service()
        .delete_product(id)
        .await
        .map_err(|e| ApiError::operation("Failed to delete product", e))?;

    Ok(success_response(
        ApiResponse::success(product).with_message("Product deleted successfully"),
    ))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/company/:company_id", get(list_company_products))
        .route(
            "/company/:company_id/warehouse/:warehouse_id",
            get(list_warehouse_products),
        )
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}
