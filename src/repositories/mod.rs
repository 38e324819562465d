use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod invoice_repository;
pub mod product_repository;
pub mod vendor_repository;

pub use invoice_repository::{InvoiceLineInput, InvoiceRepository, NewInvoice};
pub use product_repository::{ProductFilter, ProductRepository};
pub use vendor_repository::VendorRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Deduplicated, sorted keys for an `IN (...)` lookup.
pub(crate) fn distinct_ids(ids: impl IntoIterator<Item = i32>) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
