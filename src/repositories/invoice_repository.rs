use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::with_transaction;
use crate::entities::{
    pos_invoice::{self, Entity as PosInvoice, Model as InvoiceModel},
    pos_invoice_product::{self, Entity as InvoiceLine, Model as InvoiceLineModel},
    product, tax, vendor_customer, PaymentStatus,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::{distinct_ids, BaseRepository};

/// Values for a new invoice row, already validated.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub company_id: i32,
    pub customer_id: i32,
    pub tax_id: Option<i32>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub symbol: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLineInput {
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

/// Repository for POS invoices and their line items
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    base: BaseRepository,
}

impl InvoiceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<InvoiceModel>, ServiceError> {
        Ok(PosInvoice::find_by_id(id).one(self.base.get_db()).await?)
    }

    /// All invoices for a company, newest first.
    pub async fn find_by_company(&self, company_id: i32) -> Result<Vec<InvoiceModel>, ServiceError> {
        Ok(PosInvoice::find()
            .filter(pos_invoice::Column::CompanyId.eq(company_id))
            .order_by_desc(pos_invoice::Column::CreatedAt)
            .order_by_desc(pos_invoice::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    /// Line items of the given invoices, in insertion order.
    pub async fn lines_for(
        &self,
        invoice_ids: &[i32],
    ) -> Result<Vec<InvoiceLineModel>, ServiceError> {
        if invoice_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(InvoiceLine::find()
            .filter(pos_invoice_product::Column::InvoiceId.is_in(distinct_ids(invoice_ids.iter().copied())))
            .order_by_asc(pos_invoice_product::Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn product_names(
        &self,
        product_ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, String>, ServiceError> {
        let ids = distinct_ids(product_ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let products = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(self.base.get_db())
            .await?;
        Ok(products.into_iter().map(|p| (p.id, p.item_name)).collect())
    }

    pub async fn customers(
        &self,
        customer_ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, vendor_customer::Model>, ServiceError> {
        let ids = distinct_ids(customer_ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let customers = vendor_customer::Entity::find()
            .filter(vendor_customer::Column::Id.is_in(ids))
            .all(self.base.get_db())
            .await?;
        Ok(customers.into_iter().map(|c| (c.id, c)).collect())
    }

    pub async fn taxes(
        &self,
        tax_ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, tax::Model>, ServiceError> {
        let ids = distinct_ids(tax_ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let taxes = tax::Entity::find()
            .filter(tax::Column::Id.is_in(ids))
            .all(self.base.get_db())
            .await?;
        Ok(taxes.into_iter().map(|t| (t.id, t)).collect())
    }

    /// Inserts the invoice and all of its lines atomically.
    pub async fn create_with_lines(
        &self,
        invoice: NewInvoice,
        lines: Vec<InvoiceLineInput>,
    ) -> Result<InvoiceModel, ServiceError> {
        with_transaction(self.base.get_db(), move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let created = pos_invoice::ActiveModel {
                    company_id: Set(invoice.company_id),
                    customer_id: Set(invoice.customer_id),
                    tax_id: Set(invoice.tax_id),
                    subtotal: Set(invoice.subtotal),
                    total: Set(invoice.total),
                    payment_status: Set(invoice.payment_status),
                    symbol: Set(invoice.symbol),
                    currency: Set(invoice.currency),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                insert_lines(txn, created.id, lines).await?;
                Ok(created)
            })
        })
        .await
    }

    /// Updates the totals and, when `lines` is given, replaces the whole line set.
    pub async fn update_with_lines(
        &self,
        id: i32,
        subtotal: Option<Decimal>,
        total: Option<Decimal>,
        lines: Option<Vec<InvoiceLineInput>>,
    ) -> Result<InvoiceModel, ServiceError> {
        with_transaction(self.base.get_db(), move |txn| {
            Box::pin(async move {
                let existing = PosInvoice::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;

                let mut active: pos_invoice::ActiveModel = existing.into();
                if let Some(subtotal) = subtotal {
                    active.subtotal = Set(subtotal);
                }
                if let Some(total) = total {
                    active.total = Set(total);
                }
                active.updated_at = Set(Utc::now());
                let updated = active.update(txn).await?;

                if let Some(lines) = lines {
                    InvoiceLine::delete_many()
                        .filter(pos_invoice_product::Column::InvoiceId.eq(id))
                        .exec(txn)
                        .await?;
                    insert_lines(txn, id, lines).await?;
                }

                Ok(updated)
            })
        })
        .await
    }

    /// Deletes the invoice's lines, then the invoice, in one transaction.
    pub async fn delete_with_lines(&self, id: i32) -> Result<InvoiceModel, ServiceError> {
        with_transaction(self.base.get_db(), move |txn| {
            Box::pin(async move {
                let existing = PosInvoice::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;

                InvoiceLine::delete_many()
                    .filter(pos_invoice_product::Column::InvoiceId.eq(id))
                    .exec(txn)
                    .await?;
                existing.clone().delete(txn).await?;

                Ok(existing)
            })
        })
        .await
    }
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
    lines: Vec<InvoiceLineInput>,
) -> Result<(), ServiceError> {
    if lines.is_empty() {
        return Ok(());
    }

    let rows = lines.into_iter().map(|line| pos_invoice_product::ActiveModel {
        invoice_id: Set(invoice_id),
        product_id: Set(line.product_id),
        quantity: Set(line.quantity),
        price: Set(line.price),
        ..Default::default()
    });

    InvoiceLine::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

impl Repository for InvoiceRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
