//! Request extractors that turn bodies into typed, validated input.
//!
//! Both extractors reject with [`ApiError`] so malformed bodies produce the
//! standard 400 envelope instead of axum's plain-text rejections.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use validator::Validate;

use crate::common::{parse_bool, parse_date, parse_datetime, parse_decimal, parse_i32};
use crate::errors::{validation_message, ApiError};

/// JSON body that has passed its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
            })?;

        value
            .validate()
            .map_err(|e| ApiError::ValidationError(validation_message(&e)))?;

        Ok(Self(value))
    }
}

/// A buffered `multipart/form-data` body: text fields plus named files.
///
/// Blank text fields and empty file parts count as not sent.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

#[async_trait]
impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::BadRequest(format!("Invalid form body: {}", rejection.body_text()))
            })?;

        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid form body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_some() {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file '{}': {}", name, e)))?;
                if !data.is_empty() {
                    form.files.insert(name, data);
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid field '{}': {}", name, e)))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }
}

impl UploadForm {
    /// Trimmed text of a field; `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn i32(&self, name: &str) -> Result<Option<i32>, ApiError> {
        self.parsed(name, parse_i32)
    }

    pub fn decimal(&self, name: &str) -> Result<Option<Decimal>, ApiError> {
        self.parsed(name, parse_decimal)
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>, ApiError> {
        self.parsed(name, parse_bool)
    }

    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, ApiError> {
        self.parsed(name, parse_date)
    }

    pub fn datetime(&self, name: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
        self.parsed(name, parse_datetime)
    }

    /// Removes and returns the uploaded file named `name`.
    pub fn take_file(&mut self, name: &str) -> Option<Bytes> {
        self.files.remove(name)
    }

    fn parsed<T>(
        &self,
        name: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Option<T>, ApiError> {
        self.text(name)
            .map(|raw| parse(&raw))
            .transpose()
            .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    const BOUNDARY: &str = "X-POS-BOUNDARY";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn parses_text_fields_and_files() {
        let req = multipart_request(&[
            ("company_id", None, "7"),
            ("item_name", None, "  Green tea  "),
            ("sku", None, ""),
            ("sale_price", None, "3.75"),
            ("image", Some("tea.png"), "PNGDATA"),
            ("any_file", Some("empty.pdf"), ""),
        ]);
        let mut form = UploadForm::from_request(req, &()).await.unwrap();

        assert_eq!(form.i32("company_id").unwrap(), Some(7));
        assert_eq!(form.text("item_name").as_deref(), Some("Green tea"));
        assert_eq!(form.text("sku"), None);
        assert_eq!(form.decimal("sale_price").unwrap(), Some(Decimal::new(375, 2)));

        let image = form.take_file("image").unwrap();
        assert_eq!(&image[..], b"PNGDATA");
        assert!(form.take_file("any_file").is_none());
    }

    #[tokio::test]
    async fn bad_numeric_field_is_a_bad_request() {
        let req = multipart_request(&[("company_id", None, "seven")]);
        let form = UploadForm::from_request(req, &()).await.unwrap();
        let err = form.i32("company_id").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_multipart_body_is_rejected() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let err = UploadForm::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
