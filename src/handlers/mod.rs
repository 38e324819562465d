pub mod common;
pub mod forms;
pub mod invoices;
pub mod products;
pub mod vendors;

use crate::{db::DbPool, storage::SharedObjectStore};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub invoices: Arc<crate::services::InvoiceService>,
    pub products: Arc<crate::services::ProductService>,
    pub vendors: Arc<crate::services::VendorService>,
}

impl AppServices {
    /// Builds every service over one pool and one object store.
    pub fn new(db_pool: Arc<DbPool>, store: SharedObjectStore) -> Self {
        let invoices = Arc::new(crate::services::InvoiceService::new(db_pool.clone()));
        let products = Arc::new(crate::services::ProductService::new(
            db_pool.clone(),
            store.clone(),
        ));
        let vendors = Arc::new(crate::services::VendorService::new(db_pool, store));

        Self {
            invoices,
            products,
            vendors,
        }
    }
}
