use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::lenient,
    db::DbPool,
    entities::{pos_invoice, pos_invoice_product, tax, vendor_customer, PaymentStatus},
    errors::ServiceError,
    repositories::{InvoiceLineInput, InvoiceRepository, NewInvoice},
};

const MISSING_FIELDS: &str = "Missing required fields";

/// One line of an invoice as sent by the till.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InvoiceLineRequest {
    #[serde(deserialize_with = "lenient::i32")]
    #[schema(example = 12)]
    pub product_id: i32,
    #[serde(deserialize_with = "lenient::i32")]
    #[schema(example = 2)]
    pub quantity: i32,
    #[serde(deserialize_with = "lenient::decimal")]
    #[schema(value_type = f64, example = 49.5)]
    pub price: Decimal,
}

impl From<InvoiceLineRequest> for InvoiceLineInput {
    fn from(line: InvoiceLineRequest) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            price: line.price,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "company_id": 1,
    "customer_id": 4,
    "tax_id": 2,
    "subtotal": 99.0,
    "total": 103.95,
    "payment_status": "paid",
    "products": [{"product_id": 12, "quantity": 2, "price": 49.5}],
    "symbol": "$",
    "currency": "USD"
}))]
#[validate(schema(function = "validate_required_fields", skip_on_field_errors = false))]
pub struct CreateInvoiceRequest {
    #[serde(default, deserialize_with = "lenient::option_i32")]
    pub company_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient::option_i32")]
    pub customer_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient::option_i32")]
    pub tax_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    #[schema(value_type = Option<f64>)]
    pub subtotal: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    #[schema(value_type = Option<f64>)]
    pub total: Option<Decimal>,
    /// Defaults to `unpaid`
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub products: Option<Vec<InvoiceLineRequest>>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

fn validate_required_fields(request: &CreateInvoiceRequest) -> Result<(), ValidationError> {
    if request.company_id.is_none()
        || request.customer_id.is_none()
        || request.subtotal.is_none()
        || request.total.is_none()
        || request.products.is_none()
    {
        let mut err = ValidationError::new("required");
        err.message = Some(MISSING_FIELDS.into());
        return Err(err);
    }
    Ok(())
}

impl CreateInvoiceRequest {
    /// Splits a validated request into the invoice row and its lines.
    pub fn into_parts(self) -> Result<(NewInvoice, Vec<InvoiceLineInput>), ServiceError> {
        let missing = || ServiceError::ValidationError(MISSING_FIELDS.to_string());

        let lines: Vec<InvoiceLineInput> = self
            .products
            .filter(|lines| !lines.is_empty())
            .ok_or_else(missing)?
            .into_iter()
            .map(InvoiceLineInput::from)
            .collect();

        let invoice = NewInvoice {
            company_id: self.company_id.ok_or_else(missing)?,
            customer_id: self.customer_id.ok_or_else(missing)?,
            tax_id: self.tax_id,
            subtotal: self.subtotal.ok_or_else(missing)?,
            total: self.total.ok_or_else(missing)?,
            payment_status: self.payment_status.unwrap_or_default(),
            symbol: self.symbol,
            currency: self.currency,
        };

        Ok((invoice, lines))
    }
}

/// Partial invoice update. A present `products` array replaces every stored line.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceRequest {
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    #[schema(value_type = Option<f64>)]
    pub subtotal: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    #[schema(value_type = Option<f64>)]
    pub total: Option<Decimal>,
    #[serde(default)]
    #[validate(length(min = 1, message = "products must contain at least one item"))]
    pub products: Option<Vec<InvoiceLineRequest>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceLineView {
    pub id: i32,
    pub product_id: i32,
    /// Name of the referenced product, if it still exists
    pub item_name: Option<String>,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceCustomer {
    pub id: i32,
    pub name_english: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<&vendor_customer::Model> for InvoiceCustomer {
    fn from(c: &vendor_customer::Model) -> Self {
        Self {
            id: c.id,
            name_english: c.name_english.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceTax {
    pub tax_class: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub tax_value: Decimal,
}

impl From<&tax::Model> for InvoiceTax {
    fn from(t: &tax::Model) -> Self {
        Self {
            tax_class: t.tax_class.clone(),
            tax_value: t.tax_value,
        }
    }
}

/// An invoice with its lines, customer contact and tax flattened in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceView {
    pub id: i32,
    pub company_id: i32,
    pub customer_id: i32,
    pub tax_id: Option<i32>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub products: Vec<InvoiceLineView>,
    pub customer: Option<InvoiceCustomer>,
    pub tax: Option<InvoiceTax>,
}

/// Totals over every invoice of one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub total_invoices: u64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_sales: Decimal,
    pub partial_count: u64,
    pub paid_count: u64,
    pub unpaid_count: u64,
}

impl InvoiceSummary {
    pub fn from_invoices(invoices: &[pos_invoice::Model]) -> Self {
        invoices.iter().fold(Self::default(), |mut acc, invoice| {
            acc.total_invoices += 1;
            acc.total_sales += invoice.total;
            match invoice.payment_status {
                PaymentStatus::Paid => acc.paid_count += 1,
                PaymentStatus::Partial => acc.partial_count += 1,
                PaymentStatus::Unpaid => acc.unpaid_count += 1,
            }
            acc
        })
    }
}

/// Service for POS invoices
#[derive(Clone)]
pub struct InvoiceService {
    repo: InvoiceRepository,
}

impl InvoiceService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            repo: InvoiceRepository::new(db),
        }
    }

    /// Creates an invoice and its lines in one transaction
    #[instrument(skip(self, request))]
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<InvoiceView, ServiceError> {
        let (invoice, lines) = request.into_parts()?;
        let line_count = lines.len();

        let created = self.repo.create_with_lines(invoice, lines).await?;
        info!(invoice_id = created.id, line_count, "Invoice created");

        self.view(created).await
    }

    #[instrument(skip(self))]
    pub async fn list_company_invoices(
        &self,
        company_id: i32,
    ) -> Result<Vec<InvoiceView>, ServiceError> {
        let invoices = self.repo.find_by_company(company_id).await?;
        self.shape(invoices).await
    }

    #[instrument(skip(self))]
    pub async fn get_invoice(&self, id: i32) -> Result<InvoiceView, ServiceError> {
        let invoice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;
        self.view(invoice).await
    }

    /// Updates totals and, when lines are supplied, replaces all of them
    #[instrument(skip(self, request))]
    pub async fn update_invoice(
        &self,
        id: i32,
        request: UpdateInvoiceRequest,
    ) -> Result<InvoiceView, ServiceError> {
        let lines = request
            .products
            .map(|lines| lines.into_iter().map(InvoiceLineInput::from).collect::<Vec<_>>());
        if matches!(&lines, Some(lines) if lines.is_empty()) {
            return Err(ServiceError::ValidationError(
                "products must contain at least one item".to_string(),
            ));
        }

        let updated = self
            .repo
            .update_with_lines(id, request.subtotal, request.total, lines)
            .await?;
        info!(invoice_id = id, "Invoice updated");

        self.view(updated).await
    }

    /// Deletes the invoice and its lines; returns the deleted row
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, id: i32) -> Result<pos_invoice::Model, ServiceError> {
        let deleted = self.repo.delete_with_lines(id).await?;
        info!(invoice_id = id, "Invoice deleted");
        Ok(deleted)
    }

    /// Count, sales total and status breakdown for one company, computed in memory
    #[instrument(skip(self))]
    pub async fn summary(&self, company_id: i32) -> Result<InvoiceSummary, ServiceError> {
        let invoices = self.repo.find_by_company(company_id).await?;
        Ok(InvoiceSummary::from_invoices(&invoices))
    }

    async fn view(&self, invoice: pos_invoice::Model) -> Result<InvoiceView, ServiceError> {
        self.shape(vec![invoice])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::InternalError("invoice shaping produced no row".into()))
    }

    async fn shape(
        &self,
        invoices: Vec<pos_invoice::Model>,
    ) -> Result<Vec<InvoiceView>, ServiceError> {
        if invoices.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = invoices.iter().map(|i| i.id).collect();
        let lines = self.repo.lines_for(&ids).await?;
        let names = self
            .repo
            .product_names(lines.iter().map(|l| l.product_id))
            .await?;
        let customers = self
            .repo
            .customers(invoices.iter().map(|i| i.customer_id))
            .await?;
        let taxes = self
            .repo
            .taxes(invoices.iter().filter_map(|i| i.tax_id))
            .await?;

        let mut lines_by_invoice: HashMap<i32, Vec<InvoiceLineView>> = HashMap::new();
        for line in lines {
            lines_by_invoice
                .entry(line.invoice_id)
                .or_default()
                .push(line_view(line, &names));
        }

        Ok(invoices
            .into_iter()
            .map(|invoice| InvoiceView {
                products: lines_by_invoice.remove(&invoice.id).unwrap_or_default(),
                customer: customers.get(&invoice.customer_id).map(InvoiceCustomer::from),
                tax: invoice
                    .tax_id
                    .and_then(|tax_id| taxes.get(&tax_id))
                    .map(InvoiceTax::from),
                id: invoice.id,
                company_id: invoice.company_id,
                customer_id: invoice.customer_id,
                tax_id: invoice.tax_id,
                subtotal: invoice.subtotal,
                total: invoice.total,
                payment_status: invoice.payment_status,
                symbol: invoice.symbol,
                currency: invoice.currency,
                created_at: invoice.created_at,
                updated_at: invoice.updated_at,
            })
            .collect())
    }
}

fn line_view(line: pos_invoice_product::Model, names: &HashMap<i32, String>) -> InvoiceLineView {
    InvoiceLineView {
        id: line.id,
        product_id: line.product_id,
        item_name: names.get(&line.product_id).cloned(),
        quantity: line.quantity,
        price: line.price,
    }
}
