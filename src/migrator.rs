use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_companies_table::Migration),
            Box::new(m20240601_000002_create_catalog_tables::Migration),
            Box::new(m20240601_000003_create_products_table::Migration),
            Box::new(m20240601_000004_create_vendors_customers_table::Migration),
            Box::new(m20240601_000005_create_pos_invoice_tables::Migration),
        ]
    }
}

// Identifiers shared by later migrations for foreign keys.

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Address,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Warehouses {
    Table,
    Id,
    CompanyId,
    WarehouseName,
    Location,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ItemCategories {
    Table,
    Id,
    CompanyId,
    ItemCategoryName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Taxes {
    Table,
    Id,
    CompanyId,
    TaxClass,
    TaxValue,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    CompanyId,
    WarehouseId,
    ItemCategoryId,
    ItemName,
    UnitId,
    Hsn,
    Barcode,
    Sku,
    Description,
    InitialQty,
    MinOrderQty,
    AsOfDate,
    InitialCost,
    SalePrice,
    PurchasePrice,
    Discount,
    TaxAccount,
    Remarks,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VendorsCustomers {
    Table,
    Id,
    CompanyId,
    NameEnglish,
    NameArabic,
    CompanyName,
    GoogleLocation,
    IdCardImage,
    AnyFile,
    AccountType,
    BalanceType,
    AccountName,
    AccountBalance,
    CreationDate,
    BankAccountNumber,
    BankIfsc,
    BankNameBranch,
    Country,
    State,
    Pincode,
    Address,
    StateCode,
    ShippingAddress,
    Phone,
    Email,
    Type,
    CreditPeriodDays,
    EnableGst,
    GstIn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PosInvoices {
    Table,
    Id,
    CompanyId,
    CustomerId,
    TaxId,
    Subtotal,
    Total,
    PaymentStatus,
    Symbol,
    Currency,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PosInvoiceProducts {
    Table,
    Id,
    InvoiceId,
    ProductId,
    Quantity,
    Price,
}

fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).decimal_len(16, 4).to_owned()
}

mod m20240601_000001_create_companies_table {
    use super::Companies;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_companies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Companies::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .col(ColumnDef::new(Companies::Email).string().null())
                        .col(ColumnDef::new(Companies::Phone).string().null())
                        .col(ColumnDef::new(Companies::Address).string().null())
                        .col(
                            ColumnDef::new(Companies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }
}

mod m20240601_000002_create_catalog_tables {
    use super::{money, Companies, ItemCategories, Taxes, Warehouses};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Warehouses::CompanyId).integer().not_null())
                        .col(ColumnDef::new(Warehouses::WarehouseName).string().not_null())
                        .col(ColumnDef::new(Warehouses::Location).string().null())
                        .col(
                            ColumnDef::new(Warehouses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_warehouses_company_id")
                                .from(Warehouses::Table, Warehouses::CompanyId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ItemCategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemCategories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ItemCategories::CompanyId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemCategories::ItemCategoryName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemCategories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_categories_company_id")
                                .from(ItemCategories::Table, ItemCategories::CompanyId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Taxes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Taxes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Taxes::CompanyId).integer().not_null())
                        .col(ColumnDef::new(Taxes::TaxClass).string().not_null())
                        .col(money(Taxes::TaxValue).not_null())
                        .col(
                            ColumnDef::new(Taxes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_taxes_company_id")
                                .from(Taxes::Table, Taxes::CompanyId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Taxes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ItemCategories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }
}

mod m20240601_000003_create_products_table {
    use super::{money, Companies, ItemCategories, Products, Warehouses};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::CompanyId).integer().not_null())
                        .col(ColumnDef::new(Products::WarehouseId).integer().null())
                        .col(ColumnDef::new(Products::ItemCategoryId).integer().null())
                        .col(ColumnDef::new(Products::ItemName).string().not_null())
                        .col(ColumnDef::new(Products::UnitId).integer().null())
                        .col(ColumnDef::new(Products::Hsn).string().null())
                        .col(ColumnDef::new(Products::Barcode).string().null())
                        .col(ColumnDef::new(Products::Sku).string().null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::InitialQty).integer().null())
                        .col(ColumnDef::new(Products::MinOrderQty).integer().null())
                        .col(ColumnDef::new(Products::AsOfDate).date().null())
                        .col(money(Products::InitialCost).null())
                        .col(money(Products::SalePrice).null())
                        .col(money(Products::PurchasePrice).null())
                        .col(money(Products::Discount).null())
                        .col(ColumnDef::new(Products::TaxAccount).string().null())
                        .col(ColumnDef::new(Products::Remarks).text().null())
                        .col(ColumnDef::new(Products::Image).string().null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_company_id")
                                .from(Products::Table, Products::CompanyId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_warehouse_id")
                                .from(Products::Table, Products::WarehouseId)
                                .to(Warehouses::Table, Warehouses::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_item_category_id")
                                .from(Products::Table, Products::ItemCategoryId)
                                .to(ItemCategories::Table, ItemCategories::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_company_warehouse")
                        .table(Products::Table)
                        .col(Products::CompanyId)
                        .col(Products::WarehouseId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }
}

mod m20240601_000004_create_vendors_customers_table {
    use super::{money, Companies, VendorsCustomers};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_vendors_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(VendorsCustomers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VendorsCustomers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(VendorsCustomers::CompanyId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VendorsCustomers::NameEnglish)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VendorsCustomers::NameArabic).string().null())
                        .col(ColumnDef::new(VendorsCustomers::CompanyName).string().null())
                        .col(
                            ColumnDef::new(VendorsCustomers::GoogleLocation)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(VendorsCustomers::IdCardImage).string().null())
                        .col(ColumnDef::new(VendorsCustomers::AnyFile).string().null())
                        .col(ColumnDef::new(VendorsCustomers::AccountType).string().null())
                        .col(ColumnDef::new(VendorsCustomers::BalanceType).string().null())
                        .col(ColumnDef::new(VendorsCustomers::AccountName).string().null())
                        .col(
                            money(VendorsCustomers::AccountBalance)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(VendorsCustomers::CreationDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(VendorsCustomers::BankAccountNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(VendorsCustomers::BankIfsc).string().null())
                        .col(
                            ColumnDef::new(VendorsCustomers::BankNameBranch)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(VendorsCustomers::Country).string().null())
                        .col(ColumnDef::new(VendorsCustomers::State).string().null())
                        .col(ColumnDef::new(VendorsCustomers::Pincode).string().null())
                        .col(ColumnDef::new(VendorsCustomers::Address).text().null())
                        .col(ColumnDef::new(VendorsCustomers::StateCode).string().null())
                        .col(
                            ColumnDef::new(VendorsCustomers::ShippingAddress)
                                .text()
                                .null(),
                        )
                        .col(ColumnDef::new(VendorsCustomers::Phone).string().null())
                        .col(ColumnDef::new(VendorsCustomers::Email).string().null())
                        .col(
                            ColumnDef::new(VendorsCustomers::Type)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VendorsCustomers::CreditPeriodDays)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(VendorsCustomers::EnableGst)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(VendorsCustomers::GstIn).string().null())
                        .col(
                            ColumnDef::new(VendorsCustomers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(VendorsCustomers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vendors_customers_company_id")
                                .from(VendorsCustomers::Table, VendorsCustomers::CompanyId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vendors_customers_company_type")
                        .table(VendorsCustomers::Table)
                        .col(VendorsCustomers::CompanyId)
                        .col(VendorsCustomers::Type)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VendorsCustomers::Table).to_owned())
                .await
        }
    }
}

mod m20240601_000005_create_pos_invoice_tables {
    use super::{money, PosInvoiceProducts, PosInvoices, Products, Taxes, VendorsCustomers};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_pos_invoice_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PosInvoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PosInvoices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PosInvoices::CompanyId).integer().not_null())
                        .col(ColumnDef::new(PosInvoices::CustomerId).integer().not_null())
                        .col(ColumnDef::new(PosInvoices::TaxId).integer().null())
                        .col(money(PosInvoices::Subtotal).not_null())
                        .col(money(PosInvoices::Total).not_null())
                        .col(
                            ColumnDef::new(PosInvoices::PaymentStatus)
                                .string_len(16)
                                .not_null()
                                .default("unpaid"),
                        )
                        .col(ColumnDef::new(PosInvoices::Symbol).string().null())
                        .col(ColumnDef::new(PosInvoices::Currency).string().null())
                        .col(
                            ColumnDef::new(PosInvoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(PosInvoices::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pos_invoices_customer_id")
                                .from(PosInvoices::Table, PosInvoices::CustomerId)
                                .to(VendorsCustomers::Table, VendorsCustomers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pos_invoices_tax_id")
                                .from(PosInvoices::Table, PosInvoices::TaxId)
                                .to(Taxes::Table, Taxes::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pos_invoices_company_id")
                        .table(PosInvoices::Table)
                        .col(PosInvoices::CompanyId)
                        .to_owned(),
                )
                .await?;

            // No cascade: lines are removed explicitly before their invoice.
            manager
                .create_table(
                    Table::create()
                        .table(PosInvoiceProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PosInvoiceProducts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PosInvoiceProducts::InvoiceId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PosInvoiceProducts::ProductId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PosInvoiceProducts::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(money(PosInvoiceProducts::Price).not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pos_invoice_products_invoice_id")
                                .from(PosInvoiceProducts::Table, PosInvoiceProducts::InvoiceId)
                                .to(PosInvoices::Table, PosInvoices::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pos_invoice_products_product_id")
                                .from(PosInvoiceProducts::Table, PosInvoiceProducts::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pos_invoice_products_invoice_id")
                        .table(PosInvoiceProducts::Table)
                        .col(PosInvoiceProducts::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PosInvoiceProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PosInvoices::Table).to_owned())
                .await
        }
    }
}
