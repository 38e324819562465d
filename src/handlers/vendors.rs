use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;

use crate::{
    entities::{vendor_customer, PartyType},
    errors::ApiError,
    handlers::{
        common::{created_response, parse_id, success_response, validate_input},
        forms::UploadForm,
    },
    services::vendors::{VendorFields, VendorUploads, VendorView},
    ApiResponse, AppState,
};

const ID_CARD_FIELD: &str = "id_card_image";
const ANY_FILE_FIELD: &str = "any_file";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VendorTypeQuery {
    /// `vendor` or `customer`; omit for both
    #[serde(rename = "type")]
    pub party_type: Option<String>,
}

/// `vendor` or `customer`, in any letter case.
fn parse_party_type(raw: &str) -> Result<PartyType, ApiError> {
    PartyType::from_str(&raw.to_ascii_lowercase())
        .map_err(|_| ApiError::BadRequest("type must be 'vendor' or 'customer'".to_string()))
}

fn vendor_fields(form: &UploadForm) -> Result<VendorFields, ApiError> {
    let fields = VendorFields {
        company_id: form.i32("company_id")?,
        name_english: form.text("name_english"),
        name_arabic: form.text("name_arabic"),
        company_name: form.text("company_name"),
        google_location: form.text("google_location"),
        account_type: form.text("account_type"),
        balance_type: form.text("balance_type"),
        account_name: form.text("account_name"),
        account_balance: form.decimal("account_balance")?,
        creation_date: form.datetime("creation_date")?,
        bank_account_number: form.text("bank_account_number"),
        bank_ifsc: form.text("bank_ifsc"),
        bank_name_branch: form.text("bank_name_branch"),
        country: form.text("country"),
        state: form.text("state"),
        pincode: form.text("pincode"),
        address: form.text("address"),
        state_code: form.text("state_code"),
        shipping_address: form.text("shipping_address"),
        phone: form.text("phone"),
        email: form.text("email"),
        party_type: form.text("type").as_deref().map(parse_party_type).transpose()?,
        credit_period_days: form.i32("credit_period_days")?,
        enable_gst: form.bool("enable_gst")?,
        gst_in: form.text("gstIn"),
    };
    validate_input(&fields)?;
    Ok(fields)
}

fn vendor_uploads(form: &mut UploadForm) -> VendorUploads {
    VendorUploads {
        id_card_image: form.take_file(ID_CARD_FIELD),
        any_file: form.take_file(ANY_FILE_FIELD),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    request_body(content_type = "multipart/form-data", description = "Vendor fields plus optional `id_card_image` and `any_file` files"),
    responses(
        (status = 201, description = "Vendor or customer created", body = ApiResponse<vendor_customer::Model>),
        (status = 400, description = "company_id, name_english or type missing", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to create vendor", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<Response, ApiError> {
    let fields = vendor_fields(&form)?;
    let uploads = vendor_uploads(&mut form);

    let vendor = state
        .vendor_service()
        .create_vendor(fields, uploads)
        .await
        .map_err(|e| ApiError::operation("Failed to create vendor", e))?;

    let message = format!("{} created successfully", capitalize(&vendor.party_type.to_string()));
    Ok(created_response(ApiResponse::success(vendor).with_message(message)))
}

#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    responses(
        (status = 200, description = "All vendors and customers with their company", body = ApiResponse<Vec<VendorView>>)
    ),
    tag = "vendors"
)]
pub async fn list_vendors(State(state): State<AppState>) -> Result<Response, ApiError> {
    let vendors = state
        .vendor_service()
        .list_vendors()
        .await
        .map_err(|e| ApiError::operation("Failed to fetch vendors", e))?;

    let count = vendors.len();
    Ok(success_response(ApiResponse::success(vendors).with_count(count)))
}

#[utoipa::path(
    get,
    path = "/api/v1/vendors/company/{company_id}",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
        VendorTypeQuery
    ),
    responses(
        (status = 200, description = "Vendors and/or customers of the company", body = ApiResponse<Vec<vendor_customer::Model>>),
        (status = 400, description = "Unknown type filter", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn list_company_vendors(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<VendorTypeQuery>,
) -> Result<Response, ApiError> {
    let company_id = parse_id(&company_id, "company_id")?;
    let party_type = query
        .party_type
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(parse_party_type)
        .transpose()?;

    let vendors = state
        .vendor_service()
        .list_company_vendors(company_id, party_type)
        .await
        .map_err(|e| ApiError::operation("Failed to fetch vendors", e))?;

    let message = match party_type {
        Some(party_type) => format!("{}s fetched successfully", capitalize(&party_type.to_string())),
        None => "Vendors and customers fetched successfully".to_string(),
    };
    let count = vendors.len();
    Ok(success_response(
        ApiResponse::success(vendors)
            .with_message(message)
            .with_count(count),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    params(("id" = i32, Path, description = "Vendor or customer ID")),
    responses(
        (status = 200, description = "Record with company id and name", body = ApiResponse<VendorView>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let vendor = state
        .vendor_service()
        .get_vendor(id)
        .await
        .map_err(|e| ApiError::operation("Failed to fetch vendor", e))?;

    Ok(success_response(ApiResponse::success(vendor)))
}

#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}",
    params(("id" = i32, Path, description = "Vendor or customer ID")),
    request_body(content_type = "multipart/form-data", description = "Fields to change plus optional replacement files"),
    responses(
        (status = 200, description = "Record updated", body = ApiResponse<vendor_customer::Model>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut form: UploadForm,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let fields = vendor_fields(&form)?;
    let uploads = vendor_uploads(&mut form);

    let vendor = state
        .vendor_service()
        .update_vendor(id, fields, uploads)
        .await
        .map_err(|e| ApiError::operation("Failed to update vendor", e))?;

    Ok(success_response(
        ApiResponse::success(vendor).with_message("Vendor updated successfully"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{id}",
    params(("id" = i32, Path, description = "Vendor or customer ID")),
    responses(
        (status = 200, description = "Files and record deleted", body = ApiResponse<vendor_customer::Model>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "File or row deletion failed", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let vendor = state
        .vendor_service()
        .delete_vendor(id)
        .await
        .map_err(|e| ApiError::operation("Failed to delete vendor", e))?;

    Ok(success_response(
        ApiResponse::success(vendor).with_message("Vendor deleted successfully"),
    ))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendors).post(create_vendor))
        .route("/company/:company_id", get(list_company_vendors))
        .route(
            "/:id",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("vendor"), "Vendor");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn party_type_ignores_case() {
        assert_eq!(parse_party_type("Vendor").unwrap(), PartyType::Vendor);
        assert_eq!(parse_party_type("CUSTOMER").unwrap(), PartyType::Customer);
        assert!(matches!(
            parse_party_type("supplier"),
            Err(ApiError::BadRequest(msg)) if msg == "type must be 'vendor' or 'customer'"
        ));
    }
}
