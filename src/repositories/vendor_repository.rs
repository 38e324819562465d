use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    company,
    vendor_customer::{
        ActiveModel as VendorActiveModel, Column, Entity as VendorCustomer, Model as VendorModel,
    },
    PartyType,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::{distinct_ids, BaseRepository};

/// Repository for vendor and customer records
#[derive(Debug, Clone)]
pub struct VendorRepository {
    base: BaseRepository,
}

impl VendorRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<VendorModel>, ServiceError> {
        Ok(VendorCustomer::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    /// Records for one company, optionally only vendors or only customers
    pub async fn find_by_company(
        &self,
        company_id: i32,
        party_type: Option<PartyType>,
    ) -> Result<Vec<VendorModel>, ServiceError> {
        let mut query = VendorCustomer::find().filter(Column::CompanyId.eq(company_id));
        if let Some(party_type) = party_type {
            query = query.filter(Column::PartyType.eq(party_type));
        }
        Ok(query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<VendorModel>, ServiceError> {
        Ok(VendorCustomer::find_by_id(id).one(self.base.get_db()).await?)
    }

    pub async fn companies(
        &self,
        ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, company::Model>, ServiceError> {
        let ids = distinct_ids(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = company::Entity::find()
            .filter(company::Column::Id.is_in(ids))
            .all(self.base.get_db())
            .await?;
        Ok(rows.into_iter().map(|c| (c.id, c)).collect())
    }

    pub async fn create(&self, vendor: VendorActiveModel) -> Result<VendorModel, ServiceError> {
        Ok(vendor.insert(self.base.get_db()).await?)
    }

    pub async fn update(&self, vendor: VendorActiveModel) -> Result<VendorModel, ServiceError> {
        Ok(vendor.update(self.base.get_db()).await?)
    }

    pub async fn delete(&self, vendor: VendorModel) -> Result<(), ServiceError> {
        vendor.delete(self.base.get_db()).await?;
        Ok(())
    }
}

impl Repository for VendorRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
