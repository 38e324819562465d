use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Select,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    item_category,
    product::{ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel},
    warehouse,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::{distinct_ids, BaseRepository};

/// Narrows a product listing. Empty filter lists everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub company_id: Option<i32>,
    pub warehouse_id: Option<i32>,
}

impl ProductFilter {
    pub fn company(company_id: i32) -> Self {
        Self {
            company_id: Some(company_id),
            warehouse_id: None,
        }
    }

    pub fn company_warehouse(company_id: i32, warehouse_id: i32) -> Self {
        Self {
            company_id: Some(company_id),
            warehouse_id: Some(warehouse_id),
        }
    }

    fn apply(&self, mut query: Select<Product>) -> Select<Product> {
        if let Some(company_id) = self.company_id {
            query = query.filter(Column::CompanyId.eq(company_id));
        }
        if let Some(warehouse_id) = self.warehouse_id {
            query = query.filter(Column::WarehouseId.eq(warehouse_id));
        }
        query
    }
}

/// Repository for product operations
#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Products matching the filter, newest first
    pub async fn find_all(&self, filter: ProductFilter) -> Result<Vec<ProductModel>, ServiceError> {
        Ok(filter
            .apply(Product::find())
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ProductModel>, ServiceError> {
        Ok(Product::find_by_id(id).one(self.base.get_db()).await?)
    }

    pub async fn warehouses(
        &self,
        ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, warehouse::Model>, ServiceError> {
        let ids = distinct_ids(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = warehouse::Entity::find()
            .filter(warehouse::Column::Id.is_in(ids))
            .all(self.base.get_db())
            .await?;
        Ok(rows.into_iter().map(|w| (w.id, w)).collect())
    }

    pub async fn categories(
        &self,
        ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, item_category::Model>, ServiceError> {
        let ids = distinct_ids(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = item_category::Entity::find()
            .filter(item_category::Column::Id.is_in(ids))
            .all(self.base.get_db())
            .await?;
        Ok(rows.into_iter().map(|c| (c.id, c)).collect())
    }

    pub async fn create(&self, product: ProductActiveModel) -> Result<ProductModel, ServiceError> {
        Ok(product.insert(self.base.get_db()).await?)
    }

    /// Persists whichever columns are `Set` on the active model
    pub async fn update(&self, product: ProductActiveModel) -> Result<ProductModel, ServiceError> {
        Ok(product.update(self.base.get_db()).await?)
    }

    pub async fn delete(&self, product: ProductModel) -> Result<(), ServiceError> {
        product.delete(self.base.get_db()).await?;
        Ok(())
    }
}

impl Repository for ProductRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
