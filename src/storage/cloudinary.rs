use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use super::{ignore_missing, ObjectStore, StorageError};
use crate::config::StorageConfig;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Cloudinary REST client using signed uploads.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(
        api_base: impl Into<String>,
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn from_config(cfg: &StorageConfig) -> Result<Self, StorageError> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StorageError::Config(format!("{} is required for cloudinary", name)))
        };

        Ok(Self::new(
            cfg.cloudinary_api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            require(&cfg.cloudinary_cloud_name, "cloudinary_cloud_name")?,
            require(&cfg.cloudinary_api_key, "cloudinary_api_key")?,
            require(&cfg.cloudinary_api_secret, "cloudinary_api_secret")?,
        ))
    }

    /// SHA-256 signature over the alphabetically sorted parameters followed by the API secret.
    pub fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base, self.cloud_name, resource_type, action
        )
    }

    /// Destroys `public_id` under the given delivery resource type.
    #[instrument(skip(self))]
    pub async fn destroy(&self, resource_type: &str, public_id: &str) -> Result<(), StorageError> {
        let timestamp = Self::timestamp();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let params = [
            ("public_id", public_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("timestamp", timestamp),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body: DestroyResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(StorageError::Rejected(err.message));
        }
        if !status.is_success() {
            return Err(StorageError::Rejected(format!("destroy failed with {}", status)));
        }

        match body.result.as_deref() {
            Some("ok") => Ok(()),
            Some("not found") => Err(StorageError::NotFound(public_id.to_string())),
            other => Err(StorageError::Rejected(format!(
                "unexpected destroy result {:?}",
                other
            ))),
        }
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload(&self, data: Bytes, folder: &str) -> Result<String, StorageError> {
        let timestamp = Self::timestamp();
        let signature = self.sign(&[("folder", folder), ("timestamp", &timestamp)]);

        let form = Form::new()
            .part("file", Part::stream(data).file_name("upload"))
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body: UploadResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(StorageError::Rejected(err.message));
        }
        if !status.is_success() {
            return Err(StorageError::Rejected(format!("upload failed with {}", status)));
        }

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| StorageError::Rejected("upload response carried no URL".into()))?;
        debug!(%url, "Uploaded object");
        Ok(url)
    }

    async fn delete(&self, public_id: &str) -> Result<(), StorageError> {
        self.destroy("image", public_id).await
    }

    async fn delete_url(&self, url: &str) -> Result<(), StorageError> {
        match delivery_asset(url) {
            Some(asset) => ignore_missing(
                url,
                self.destroy(asset.resource_type, &asset.public_id).await,
            ),
            None => {
                warn!(url, "Skipping blob delete for unrecognised URL");
                Ok(())
            }
        }
    }

    fn public_id(&self, url: &str) -> Option<String> {
        public_id_from_delivery_url(url)
    }
}

/// A stored object as addressed by its delivery URL.
#[derive(Debug, PartialEq, Eq)]
pub struct DeliveryAsset {
    pub resource_type: &'static str,
    pub public_id: String,
}

/// `https://res.cloudinary.com/demo/image/upload/v1712/products/abc.jpg` -> `products/abc`
pub fn public_id_from_delivery_url(url: &str) -> Option<String> {
    delivery_asset(url).map(|asset| asset.public_id)
}

/// Splits a delivery URL into resource type and public id. Raw public ids
/// keep their extension; image and video ids drop it.
pub fn delivery_asset(url: &str) -> Option<DeliveryAsset> {
    let (before_upload, after_upload) = url.split_once("/upload/")?;
    let resource_type = match before_upload.rsplit('/').next() {
        Some("raw") => "raw",
        Some("video") => "video",
        _ => "image",
    };
    let path = after_upload.split(['?', '#']).next()?;

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments
        .first()
        .map(|s| s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
    {
        segments.remove(0);
    }

    let last = segments.pop()?;
    let name = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() && resource_type != "raw" => stem,
        _ => last,
    };
    segments.push(name);
    Some(DeliveryAsset {
        resource_type,
        public_id: segments.join("/"),
    })
}
