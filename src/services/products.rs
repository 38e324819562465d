use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{item_category, product, warehouse},
    errors::ServiceError,
    repositories::{ProductFilter, ProductRepository},
    storage::SharedObjectStore,
};

/// Object store folder for product images
pub const PRODUCT_IMAGE_FOLDER: &str = "products";

/// Product columns accepted from a form. `None` means the field was not sent.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProductFields {
    pub company_id: Option<i32>,
    pub warehouse_id: Option<i32>,
    pub item_category_id: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "item_name must be 1-255 characters"))]
    pub item_name: Option<String>,
    pub unit_id: Option<i32>,
    pub hsn: Option<String>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub initial_qty: Option<i32>,
    pub min_order_qty: Option<i32>,
    pub as_of_date: Option<NaiveDate>,
    pub initial_cost: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax_account: Option<String>,
    pub remarks: Option<String>,
}

macro_rules! set_present {
    ($active:ident, [$($col:ident),* $(,)?]) => {
        $(
            if let Some(value) = $col {
                $active.$col = Set(Some(value));
            }
        )*
    };
}

impl ProductFields {
    /// Applies every present field onto `active`.
    fn apply(self, active: &mut product::ActiveModel) {
        let ProductFields {
            company_id,
            warehouse_id,
            item_category_id,
            item_name,
            unit_id,
            hsn,
            barcode,
            sku,
            description,
            initial_qty,
            min_order_qty,
            as_of_date,
            initial_cost,
            sale_price,
            purchase_price,
            discount,
            tax_account,
            remarks,
        } = self;

        if let Some(company_id) = company_id {
            active.company_id = Set(company_id);
        }
        if let Some(item_name) = item_name {
            active.item_name = Set(item_name);
        }
        set_present!(
            active,
            [
                warehouse_id,
                item_category_id,
                unit_id,
                hsn,
                barcode,
                sku,
                description,
                initial_qty,
                min_order_qty,
                as_of_date,
                initial_cost,
                sale_price,
                purchase_price,
                discount,
                tax_account,
                remarks,
            ]
        );
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WarehouseRef {
    pub id: i32,
    pub warehouse_name: String,
    pub location: Option<String>,
}

impl From<&warehouse::Model> for WarehouseRef {
    fn from(w: &warehouse::Model) -> Self {
        Self {
            id: w.id,
            warehouse_name: w.warehouse_name.clone(),
            location: w.location.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryRef {
    pub id: i32,
    pub item_category_name: String,
}

impl From<&item_category::Model> for CategoryRef {
    fn from(c: &item_category::Model) -> Self {
        Self {
            id: c.id,
            item_category_name: c.item_category_name.clone(),
        }
    }
}

/// A product row with its warehouse and category joined in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: product::Model,
    pub warehouse: Option<WarehouseRef>,
    pub item_category: Option<CategoryRef>,
}

/// Service for managing products and their images
#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
    store: SharedObjectStore,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, store: SharedObjectStore) -> Self {
        Self {
            repo: ProductRepository::new(db),
            store,
        }
    }

    /// Uploads the image (if any) and inserts the product
    #[instrument(skip(self, fields, image))]
    pub async fn create_product(
        &self,
        fields: ProductFields,
        image: Option<Bytes>,
    ) -> Result<ProductView, ServiceError> {
        fields.validate()?;
        if fields.company_id.is_none() || fields.item_name.is_none() {
            return Err(ServiceError::ValidationError(
                "company_id and item_name are required".to_string(),
            ));
        }

        let image_url = match image {
            Some(data) => Some(self.store.upload(data, PRODUCT_IMAGE_FOLDER).await?),
            None => None,
        };

        let now = Utc::now();
        let mut active = product::ActiveModel {
            id: NotSet,
            image: Set(image_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        fields.apply(&mut active);

        let created = match self.repo.create(active).await {
            Ok(created) => created,
            Err(err) => {
                if let Some(url) = image_url {
                    self.discard_blob(&url).await;
                }
                return Err(err);
            }
        };
        info!(product_id = created.id, "Product created");

        self.view(created).await
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductView>, ServiceError> {
        let products = self.repo.find_all(filter).await?;
        self.shape(products).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> Result<ProductView, ServiceError> {
        let product = self.find(id).await?;
        self.view(product).await
    }

    /// Changes the fields that were sent. A new image is uploaded before the
    /// old one is removed.
    #[instrument(skip(self, fields, image))]
    pub async fn update_product(
        &self,
        id: i32,
        fields: ProductFields,
        image: Option<Bytes>,
    ) -> Result<ProductView, ServiceError> {
        fields.validate()?;
        let existing = self.find(id).await?;
        let old_image = existing.image.clone();

        let new_image = match image {
            Some(data) => Some(self.store.upload(data, PRODUCT_IMAGE_FOLDER).await?),
            None => None,
        };

        let mut active: product::ActiveModel = existing.into();
        fields.apply(&mut active);
        if let Some(url) = &new_image {
            active.image = Set(Some(url.clone()));
        }
        active.updated_at = Set(Utc::now());

        let updated = match self.repo.update(active).await {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(url) = new_image {
                    self.discard_blob(&url).await;
                }
                return Err(err);
            }
        };

        if let (Some(_), Some(old)) = (&new_image, old_image) {
            self.discard_blob(&old).await;
        }
        info!(product_id = id, "Product updated");

        self.view(updated).await
    }

    /// Deletes the image first, then the row. A failed blob delete keeps the row.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> Result<product::Model, ServiceError> {
        let existing = self.find(id).await?;

        if let Some(url) = &existing.image {
            self.store.delete_url(url).await?;
        }
        self.repo.delete(existing.clone()).await?;
        info!(product_id = id, "Product deleted");

        Ok(existing)
    }

    async fn find(&self, id: i32) -> Result<product::Model, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    async fn discard_blob(&self, url: &str) {
        if let Err(err) = self.store.delete_url(url).await {
            warn!(url, error = %err, "Failed to delete superseded product image");
        }
    }

    async fn view(&self, product: product::Model) -> Result<ProductView, ServiceError> {
        self.shape(vec![product])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::InternalError("product shaping produced no row".into()))
    }

    async fn shape(&self, products: Vec<product::Model>) -> Result<Vec<ProductView>, ServiceError> {
        let warehouses = self
            .repo
            .warehouses(products.iter().filter_map(|p| p.warehouse_id))
            .await?;
        let categories = self
            .repo
            .categories(products.iter().filter_map(|p| p.item_category_id))
            .await?;

        Ok(products
            .into_iter()
            .map(|product| ProductView {
                warehouse: product
                    .warehouse_id
                    .and_then(|id| warehouses.get(&id))
                    .map(WarehouseRef::from),
                item_category: product
                    .item_category_id
                    .and_then(|id| categories.get(&id))
                    .map(CategoryRef::from),
                product,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::ActiveValue;

    #[test]
    fn apply_only_touches_present_fields() {
        let mut active = product::ActiveModel::default();
        ProductFields {
            item_name: Some("Espresso beans".into()),
            sale_price: Some(dec!(12.5)),
            ..Default::default()
        }
        .apply(&mut active);

        assert!(matches!(&active.item_name, ActiveValue::Set(name) if name == "Espresso beans"));
        assert!(matches!(active.sale_price, ActiveValue::Set(Some(price)) if price == dec!(12.5)));
        assert!(matches!(active.barcode, ActiveValue::NotSet));
        assert!(matches!(active.company_id, ActiveValue::NotSet));
    }

    #[test]
    fn empty_item_name_is_rejected() {
        let fields = ProductFields {
            item_name: Some(String::new()),
            ..Default::default()
        };
        assert!(fields.validate().is_err());
    }
}
