//! Parsing helpers shared by the JSON and multipart request boundaries.
//!
//! Point-of-sale clients send ids and amounts either as JSON numbers or as
//! numeric strings, and multipart forms only ever carry strings, so every
//! numeric input goes through the same lenient parsers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrString {
    fn into_text(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s.trim().to_string(),
        }
    }
}

pub fn parse_i32(raw: &str) -> Result<i32, String> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i32>() {
        return Ok(value);
    }
    // "3.0" is accepted as 3, "3.5" is not.
    match parse_decimal(raw) {
        Ok(d) if d.fract().is_zero() => d
            .to_i32()
            .ok_or_else(|| format!("'{}' is out of range", raw)),
        _ => Err(format!("'{}' is not a valid integer", raw)),
    }
}

pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| format!("'{}' is not a valid number", raw))
}

/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("'{}' is not a valid boolean", other)),
    }
}

/// Accepts a bare `YYYY-MM-DD` or the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| format!("'{}' is not a valid date", raw))
}

/// Accepts an RFC 3339 timestamp or a bare date, taken as midnight UTC.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{}' is not a valid date", raw))
}

/// `deserialize_with` adapters for number-or-string JSON fields.
pub mod lenient {
    use super::*;
    use serde::de::Error;

    pub fn i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        let raw = NumberOrString::deserialize(deserializer)?.into_text();
        parse_i32(&raw).map_err(D::Error::custom)
    }

    /// `null`, a missing field and `""` all read as `None`.
    pub fn option_i32<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i32>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(value) => {
                let raw = value.into_text();
                if raw.is_empty() {
                    Ok(None)
                } else {
                    parse_i32(&raw).map(Some).map_err(D::Error::custom)
                }
            }
        }
    }

    pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = NumberOrString::deserialize(deserializer)?.into_text();
        parse_decimal(&raw).map_err(D::Error::custom)
    }

    pub fn option_decimal<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(value) => {
                let raw = value.into_text();
                if raw.is_empty() {
                    Ok(None)
                } else {
                    parse_decimal(&raw).map(Some).map_err(D::Error::custom)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "lenient::i32")]
        id: i32,
        #[serde(default, deserialize_with = "lenient::option_i32")]
        tax_id: Option<i32>,
        #[serde(deserialize_with = "lenient::decimal")]
        total: Decimal,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let a: Sample = serde_json::from_str(r#"{"id": 7, "tax_id": "2", "total": 12.5}"#).unwrap();
        let b: Sample =
            serde_json::from_str(r#"{"id": "7", "tax_id": 2, "total": "12.50"}"#).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.tax_id, Some(2));
        assert_eq!(a.total, b.total);
        assert_eq!(a.total, dec!(12.5));
    }

    #[test]
    fn empty_or_null_optional_is_none() {
        let a: Sample = serde_json::from_str(r#"{"id": 1, "tax_id": "", "total": 0}"#).unwrap();
        let b: Sample = serde_json::from_str(r#"{"id": 1, "tax_id": null, "total": 0}"#).unwrap();
        let c: Sample = serde_json::from_str(r#"{"id": 1, "total": 0}"#).unwrap();
        assert!(a.tax_id.is_none() && b.tax_id.is_none() && c.tax_id.is_none());
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": "abc", "total": 1}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"id": 1, "total": "ten"}"#).is_err());
    }

    #[test]
    fn integer_parser_accepts_whole_decimals_only() {
        assert_eq!(parse_i32("3.0"), Ok(3));
        assert!(parse_i32("3.5").is_err());
        assert!(parse_i32("99999999999").is_err());
    }

    #[test]
    fn bool_and_date_parsers() {
        assert_eq!(parse_bool("TRUE"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert!(parse_bool("maybe").is_err());
        assert_eq!(
            parse_date("2024-05-01T10:00:00Z").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(
            parse_datetime("2024-05-01").unwrap().to_rfc3339(),
            "2024-05-01T00:00:00+00:00"
        );
    }
}
