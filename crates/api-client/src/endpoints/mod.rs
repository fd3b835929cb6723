//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for one backend resource and
//! reshapes gateway results into [`Outcome`] values.
//!
//! ## Mapping to the backend
//!
//! | Module | Base path | Description |
//! |--------|-----------|-------------|
//! | `auth` | `auth` | Login, profile, logout, token refresh |
//! | `cars` | `Car` | Vehicle fleet CRUD |
//! | `brands` | `brands` | Vehicle brand CRUD |
//! | `clients` | `clients` | Rental customers |
//! | `rentals` | `rentals` | Rental contracts |

pub mod auth;
pub mod brands;
pub mod cars;
pub mod clients;
pub mod rentals;

pub use auth::{AuthApi, Credentials};
pub use brands::{Brand, BrandDraft, BrandsApi};
pub use cars::{Car, CarDraft, CarsApi};
pub use clients::{Client, ClientDraft, ClientsApi};
pub use rentals::{Rental, RentalDraft, RentalsApi};

use crate::error::GatewayResult;
use crate::response::{body_message, error_message, str_field, NormalizedResponse, Outcome};

/// Status codes accepted for create calls
pub(crate) const CREATED: &[u16] = &[200, 201];

/// Status code accepted for everything else
pub(crate) const OK: &[u16] = &[200];

/// Reshape a gateway result into an [`Outcome`]
///
/// `ok` depends only on `expected`; `data` is extracted from successful
/// responses only.
pub(crate) fn reshape<T>(
    result: GatewayResult,
    expected: &[u16],
    success: &str,
    failure: &str,
    data: impl FnOnce(&NormalizedResponse) -> Option<T>,
) -> Outcome<T> {
    match result {
        Ok(response) if response.has_status(expected) => {
            let message = str_field(&response.data, "message").unwrap_or(success);
            Outcome::success(message, data(&response))
        }
        Ok(response) => Outcome::failure(body_message(&response.data).unwrap_or(failure)),
        Err(e) => Outcome::failure(error_message(&e, failure)),
    }
}

/// Lenient deserializers for fields the backend is inconsistent about
pub(crate) mod lenient {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Number or numeric string
    pub fn f64_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Integer or numeric string
    pub fn i64_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// String or number rendered as a string
    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    }

    /// `YYYY-MM-DD`, with or without a trailing time component
    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
        let day = raw.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizedError;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn response(status: u16, data: serde_json::Value) -> NormalizedResponse {
        NormalizedResponse {
            status,
            data,
            message: "fallback".to_string(),
            headers: BTreeMap::new(),
        }
    }

    #[test]
    fn test_reshape_ok_depends_on_status_only() {
        let outcome = reshape(Ok(response(201, json!({}))), CREATED, "Created", "Failed", |r| {
            r.payload().cloned()
        });
        assert!(outcome.ok);
        assert!(outcome.data.is_none());
        assert_eq!(outcome.message, "Created");

        let outcome = reshape(
            Ok(response(201, json!({ "data": { "id": 1 } }))),
            OK,
            "Created",
            "Failed",
            |r| r.payload().cloned(),
        );
        assert!(!outcome.ok);
        assert!(outcome.data.is_none());
        assert_eq!(outcome.message, "Failed");
    }

    #[test]
    fn test_reshape_resolved_failure_uses_body() {
        let outcome: Outcome<()> = reshape(
            Ok(response(422, json!({ "detail": "modelo is required" }))),
            OK,
            "ok",
            "Failed",
            |_| None,
        );
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "modelo is required");
    }

    #[test]
    fn test_reshape_rejection() {
        let outcome: Outcome<()> = reshape(Err(NormalizedError::timeout()), OK, "ok", "Failed", |_| None);
        assert!(!outcome.ok);
        assert_eq!(outcome.message, crate::error::TIMEOUT_MESSAGE);
    }

    #[test]
    fn test_parse_date_variants() {
        assert!(lenient::parse_date("2025-03-01").is_some());
        assert!(lenient::parse_date("2025-03-01T00:00:00.000Z").is_some());
        assert!(lenient::parse_date("03/01/2025").is_none());
        assert!(lenient::parse_date("2025").is_none());
    }
}
