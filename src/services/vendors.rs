use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{company, vendor_customer, PartyType},
    errors::ServiceError,
    repositories::VendorRepository,
    storage::SharedObjectStore,
};

pub const ID_CARD_FOLDER: &str = "vendorsCustomer/id_cards";
pub const FILE_FOLDER: &str = "vendorsCustomer/files";

/// Vendor/customer columns accepted from a form. `None` means not sent.
#[derive(Debug, Clone, Default, Validate)]
pub struct VendorFields {
    pub company_id: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "name_english must be 1-255 characters"))]
    pub name_english: Option<String>,
    pub name_arabic: Option<String>,
    pub company_name: Option<String>,
    pub google_location: Option<String>,
    pub account_type: Option<String>,
    pub balance_type: Option<String>,
    pub account_name: Option<String>,
    pub account_balance: Option<Decimal>,
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
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    pub party_type: Option<PartyType>,
    #[validate(range(min = 0, message = "credit_period_days must not be negative"))]
    pub credit_period_days: Option<i32>,
    pub enable_gst: Option<bool>,
    pub gst_in: Option<String>,
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

impl VendorFields {
    fn apply(self, active: &mut vendor_customer::ActiveModel) {
        let VendorFields {
            company_id,
            name_english,
            name_arabic,
            company_name,
            google_location,
            account_type,
            balance_type,
            account_name,
            account_balance,
            creation_date,
            bank_account_number,
            bank_ifsc,
            bank_name_branch,
            country,
            state,
            pincode,
            address,
            state_code,
            shipping_address,
            phone,
            email,
            party_type,
            credit_period_days,
            enable_gst,
            gst_in,
        } = self;

        if let Some(v) = company_id {
            active.company_id = Set(v);
        }
        if let Some(v) = name_english {
            active.name_english = Set(v);
        }
        if let Some(v) = party_type {
            active.party_type = Set(v);
        }
        if let Some(v) = account_balance {
            active.account_balance = Set(v);
        }
        if let Some(v) = credit_period_days {
            active.credit_period_days = Set(v);
        }
        if let Some(v) = enable_gst {
            active.enable_gst = Set(v);
        }
        set_present!(
            active,
            [
                name_arabic,
                company_name,
                google_location,
                account_type,
                balance_type,
                account_name,
                creation_date,
                bank_account_number,
                bank_ifsc,
                bank_name_branch,
                country,
                state,
                pincode,
                address,
                state_code,
                shipping_address,
                phone,
                email,
                gst_in,
            ]
        );
    }
}

/// Files attached to a vendor form.
#[derive(Debug, Clone, Default)]
pub struct VendorUploads {
    pub id_card_image: Option<Bytes>,
    pub any_file: Option<Bytes>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyRef {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CompanyRef {
    fn with_email(c: &company::Model) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
        }
    }

    fn brief(c: &company::Model) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: None,
        }
    }
}

/// A vendor/customer row with its company joined in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VendorView {
    #[serde(flatten)]
    pub vendor: vendor_customer::Model,
    pub company: Option<CompanyRef>,
}

/// Service for vendor and customer records and their documents
#[derive(Clone)]
pub struct VendorService {
    repo: VendorRepository,
    store: SharedObjectStore,
}

impl VendorService {
    pub fn new(db: Arc<DbPool>, store: SharedObjectStore) -> Self {
        Self {
            repo: VendorRepository::new(db),
            store,
        }
    }

    #[instrument(skip(self, fields, uploads))]
    pub async fn create_vendor(
        &self,
        fields: VendorFields,
        uploads: VendorUploads,
    ) -> Result<vendor_customer::Model, ServiceError> {
        fields.validate()?;
        if fields.company_id.is_none() || fields.name_english.is_none() || fields.party_type.is_none()
        {
            return Err(ServiceError::ValidationError(
                "company_id, name_english and type are required".to_string(),
            ));
        }

        let (id_card_url, file_url) = self.upload_all(uploads).await?;

        let now = Utc::now();
        let mut active = vendor_customer::ActiveModel {
            id_card_image: Set(id_card_url.clone()),
            any_file: Set(file_url.clone()),
            account_balance: Set(Decimal::ZERO),
            credit_period_days: Set(0),
            enable_gst: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        fields.apply(&mut active);

        match self.repo.create(active).await {
            Ok(created) => {
                info!(vendor_id = created.id, party_type = %created.party_type, "Vendor created");
                Ok(created)
            }
            Err(err) => {
                self.discard_blobs([id_card_url, file_url]).await;
                Err(err)
            }
        }
    }

    /// Every record across companies, with company id, name and email
    #[instrument(skip(self))]
    pub async fn list_vendors(&self) -> Result<Vec<VendorView>, ServiceError> {
        let vendors = self.repo.find_all().await?;
        self.shape(vendors, CompanyRef::with_email).await
    }

    #[instrument(skip(self))]
    pub async fn list_company_vendors(
        &self,
        company_id: i32,
        party_type: Option<PartyType>,
    ) -> Result<Vec<vendor_customer::Model>, ServiceError> {
        self.repo.find_by_company(company_id, party_type).await
    }

    #[instrument(skip(self))]
    pub async fn get_vendor(&self, id: i32) -> Result<VendorView, ServiceError> {
        let vendor = self.find(id).await?;
        self.shape(vec![vendor], CompanyRef::brief)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::InternalError("vendor shaping produced no row".into()))
    }

    /// Changes the fields that were sent. Replacement files are uploaded
    /// before the superseded ones are removed.
    #[instrument(skip(self, fields, uploads))]
    pub async fn update_vendor(
        &self,
        id: i32,
        fields: VendorFields,
        uploads: VendorUploads,
    ) -> Result<vendor_customer::Model, ServiceError> {
        fields.validate()?;
        let existing = self.find(id).await?;

        let (id_card_url, file_url) = self.upload_all(uploads).await?;

        let mut superseded = Vec::new();
        let mut active: vendor_customer::ActiveModel = existing.clone().into();
        fields.apply(&mut active);
        if let Some(url) = &id_card_url {
            active.id_card_image = Set(Some(url.clone()));
            superseded.push(existing.id_card_image.clone());
        }
        if let Some(url) = &file_url {
            active.any_file = Set(Some(url.clone()));
            superseded.push(existing.any_file.clone());
        }
        active.updated_at = Set(Utc::now());

        let updated = match self.repo.update(active).await {
            Ok(updated) => updated,
            Err(err) => {
                self.discard_blobs([id_card_url, file_url]).await;
                return Err(err);
            }
        };

        self.discard_blobs(superseded).await;
        info!(vendor_id = id, "Vendor updated");
        Ok(updated)
    }

    /// Deletes both attached files, then the row. A failed blob delete keeps the row.
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, id: i32) -> Result<vendor_customer::Model, ServiceError> {
        let existing = self.find(id).await?;

        for url in [&existing.id_card_image, &existing.any_file]
            .into_iter()
            .flatten()
        {
            self.store.delete_url(url).await?;
        }
        self.repo.delete(existing.clone()).await?;
        info!(vendor_id = id, "Vendor deleted");

        Ok(existing)
    }

    async fn find(&self, id: i32) -> Result<vendor_customer::Model, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Vendor not found".to_string()))
    }

    async fn upload_all(
        &self,
        uploads: VendorUploads,
    ) -> Result<(Option<String>, Option<String>), ServiceError> {
        let id_card_url = match uploads.id_card_image {
            Some(data) => Some(self.store.upload(data, ID_CARD_FOLDER).await?),
            None => None,
        };
        let file_url = match uploads.any_file {
            Some(data) => match self.store.upload(data, FILE_FOLDER).await {
                Ok(url) => Some(url),
                Err(err) => {
                    self.discard_blobs([id_card_url]).await;
                    return Err(err.into());
                }
            },
            None => None,
        };
        Ok((id_card_url, file_url))
    }

    async fn discard_blobs(&self, urls: impl IntoIterator<Item = Option<String>>) {
        for url in urls.into_iter().flatten() {
            if let Err(err) = self.store.delete_url(&url).await {
                warn!(url, error = %err, "Failed to delete superseded vendor file");
            }
        }
    }

    async fn shape(
        &self,
        vendors: Vec<vendor_customer::Model>,
        company_ref: fn(&company::Model) -> CompanyRef,
    ) -> Result<Vec<VendorView>, ServiceError> {
        let companies = self
            .repo
            .companies(vendors.iter().map(|v| v.company_id))
            .await?;

        Ok(vendors
            .into_iter()
            .map(|vendor| VendorView {
                company: companies.get(&vendor.company_id).map(company_ref),
                vendor,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn apply_leaves_absent_fields_untouched() {
        let mut active = vendor_customer::ActiveModel::default();
        VendorFields {
            phone: Some("+971500000000".into()),
            enable_gst: Some(true),
            ..Default::default()
        }
        .apply(&mut active);

        assert!(matches!(&active.phone, ActiveValue::Set(Some(p)) if p == "+971500000000"));
        assert!(matches!(active.enable_gst, ActiveValue::Set(true)));
        assert!(matches!(active.email, ActiveValue::NotSet));
        assert!(matches!(active.account_balance, ActiveValue::NotSet));
    }

    #[test]
    fn rejects_malformed_email() {
        let fields = VendorFields {
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(fields.validate().is_err());
    }
}
