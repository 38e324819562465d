use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tax classes an invoice may reference, e.g. `GST 18%`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "taxes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: i32,
    pub tax_class: String,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_value: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pos_invoice::Entity")]
    PosInvoices,
}

impl Related<super::pos_invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosInvoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
