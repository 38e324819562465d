pub mod company;
pub mod item_category;
pub mod pos_invoice;
pub mod pos_invoice_product;
pub mod product;
pub mod tax;
pub mod vendor_customer;
pub mod warehouse;

pub use pos_invoice::PaymentStatus;
pub use vendor_customer::PartyType;
