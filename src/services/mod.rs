pub mod invoices;
pub mod products;
pub mod vendors;

pub use invoices::InvoiceService;
pub use products::ProductService;
pub use vendors::VendorService;
