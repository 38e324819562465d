use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Whether a `vendors_customers` row is a supplier or a buyer.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PartyType {
    #[sea_orm(string_value = "vendor")]
    Vendor,
    #[sea_orm(string_value = "customer")]
    Customer,
}

/// The `vendors_customers` table. Vendors and customers share one shape.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "vendors_customers")]
#[schema(as = VendorCustomer)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: i32,
    pub name_english: String,
    pub name_arabic: Option<String>,
    pub company_name: Option<String>,
    pub google_location: Option<String>,
    /// URL of the uploaded ID card image
    pub id_card_image: Option<String>,
    /// URL of an arbitrary uploaded document
    pub any_file: Option<String>,
    pub account_type: Option<String>,
    pub balance_type: Option<String>,
    pub account_name: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub account_balance: Decimal,
    pub creation_date: Option<DateTime<Utc>>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub bank_name_branch: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub state_code: Option<String>,
    pub shipping_address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub party_type: PartyType,
    pub credit_period_days: i32,
    pub enable_gst: bool,
    #[serde(rename = "gstIn")]
    pub gst_in: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::pos_invoice::Entity")]
    PosInvoices,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::pos_invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosInvoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
