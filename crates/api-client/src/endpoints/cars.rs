//! Vehicle endpoints
//!
//! Maps to the `Car` resource. Lists are requested with `include=Brand` so
//! the backend can embed the brand, and the brand foreign key is written
//! under the configured [`BrandKey`].

use super::{lenient, reshape, CREATED, OK};
use crate::client::{RentacarClient, RequestOptions};
use crate::config::BrandKey;
use crate::resource::Resource;
use crate::response::{body_message, decode_items, error_message, extract_items, str_field, Outcome};
use crate::validation::ValidationErrors;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Base path of the cars resource
pub const CARS_PATH: &str = "Car";

/// Message used when the backend refuses to list vehicles without a session
pub const AUTH_REQUIRED_MESSAGE: &str = "Access to vehicles requires authentication. Please sign in.";

/// Oldest model year accepted by the vehicle form
pub const MIN_YEAR: i32 = 1900;

/// Cars API interface
#[derive(Clone)]
pub struct CarsApi {
    resource: Resource,
    brand_key: BrandKey,
}

/// Vehicle as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Backend id
    pub id: i64,
    /// Model name
    #[serde(rename = "modelo", default)]
    pub model: String,
    /// Model year
    #[serde(rename = "anio", default, deserialize_with = "lenient::i64_opt")]
    pub year: Option<i64>,
    /// Daily rental price
    #[serde(rename = "precio_dia", default, deserialize_with = "lenient::f64_opt")]
    pub daily_price: Option<f64>,
    /// Whether the car can be rented right now
    #[serde(rename = "disponible", default = "default_true")]
    pub available: bool,
    /// Soft-delete flag
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Everything else, including the brand reference
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl Car {
    /// Brand id stored under `key`
    #[must_use]
    pub fn brand_id(&self, key: &BrandKey) -> Option<i64> {
        match self.extra.get(key.as_str())? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Brand name embedded by the backend (`Brand` or `marca`)
    #[must_use]
    pub fn embedded_brand_name(&self) -> Option<String> {
        for key in ["Brand", "marca"] {
            match self.extra.get(key) {
                Some(Value::Object(brand)) => {
                    let brand = Value::Object(brand.clone());
                    let name = str_field(&brand, "nombre")
                        .or_else(|| str_field(&brand, "name"))
                        .or_else(|| str_field(&brand, "marca"));
                    if let Some(name) = name {
                        return Some(name.to_string());
                    }
                }
                Some(Value::String(name)) if !name.is_empty() => return Some(name.clone()),
                _ => {}
            }
        }
        None
    }

    /// Brand label for listings
    ///
    /// Prefers the embedded brand, then the lookup map, then the bare id.
    #[must_use]
    pub fn brand_label(&self, key: &BrandKey, names: &HashMap<i64, String>) -> String {
        if let Some(name) = self.embedded_brand_name() {
            return name;
        }
        match self.brand_id(key) {
            Some(id) => names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("Brand #{id}")),
            None => "No brand".to_string(),
        }
    }
}

/// Vehicle form contents
#[derive(Debug, Clone, PartialEq)]
pub struct CarDraft {
    /// Selected brand
    pub brand_id: Option<i64>,
    /// Model name
    pub model: String,
    /// Model year
    pub year: Option<i64>,
    /// Daily price
    pub daily_price: Option<f64>,
    /// Available for rental
    pub available: bool,
    /// Active in the fleet
    pub is_active: bool,
}

impl Default for CarDraft {
    fn default() -> Self {
        Self {
            brand_id: None,
            model: String::new(),
            year: None,
            daily_price: None,
            available: true,
            is_active: true,
        }
    }
}

impl CarDraft {
    /// Pre-fill the form from an existing car
    #[must_use]
    pub fn from_car(car: &Car, key: &BrandKey) -> Self {
        Self {
            brand_id: car.brand_id(key),
            model: car.model.clone(),
            year: car.year,
            daily_price: car.daily_price,
            available: car.available,
            is_active: car.is_active,
        }
    }

    /// Check the form against the fleet rules
    pub fn validate(&self, current_year: i32) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.brand_id.is_none(), "brand_id", "Brand is required");
        errors.check(self.model.trim().is_empty(), "model", "Model is required");
        if let Some(year) = self.year {
            let max = i64::from(current_year) + 1;
            errors.check(
                year < i64::from(MIN_YEAR),
                "year",
                "Year must be 1900 or later",
            );
            errors.check(year > max, "year", "Year cannot be later than next year");
        }
        if let Some(price) = self.daily_price {
            errors.check(
                !price.is_finite() || price < 0.0,
                "daily_price",
                "Daily price must be zero or more",
            );
        }
        errors.into_result()
    }

    /// Wire payload with the brand id under `key`
    #[must_use]
    pub fn to_payload(&self, key: &BrandKey) -> Value {
        let mut payload = Map::new();
        payload.insert(
            key.as_str().to_string(),
            self.brand_id.map_or(Value::Null, Value::from),
        );
        payload.insert("modelo".into(), Value::from(self.model.trim()));
        if let Some(year) = self.year {
            payload.insert("anio".into(), Value::from(year));
        }
        if let Some(price) = self.daily_price {
            payload.insert("precio_dia".into(), Value::from(price));
        }
        payload.insert("disponible".into(), Value::from(self.available));
        payload.insert("is_active".into(), Value::from(self.is_active));
        Value::Object(payload)
    }
}

impl CarsApi {
    /// Create a new cars API interface
    pub(crate) fn new(client: RentacarClient) -> Self {
        let brand_key = client.config().brand_key.clone();
        Self {
            resource: client.resource(CARS_PATH, "Car"),
            brand_key,
        }
    }

    /// Field name used for the brand reference
    #[must_use]
    pub fn brand_key(&self) -> &BrandKey {
        &self.brand_key
    }

    /// List vehicles, embedding brands when the backend supports it
    pub async fn list(&self, params: &[(String, String)]) -> Outcome<Vec<Car>> {
        let options = RequestOptions::new()
            .with_query_pairs(params.iter().cloned())
            .with_query("include", "Brand");

        match self.resource.list(options).await {
            Ok(response) if response.status == 200 => {
                let cars: Vec<Car> = decode_items(extract_items(&response.data));
                debug!(count = cars.len(), "Vehicles fetched");
                Outcome::success("Vehicle list fetched.", Some(cars))
            }
            Ok(response) => Outcome::failure(
                body_message(&response.data).unwrap_or("Failed to fetch vehicles."),
            ),
            Err(e) if e.kind.is_auth() => {
                Outcome::failure(str_field(e.data(), "message").unwrap_or(AUTH_REQUIRED_MESSAGE))
            }
            Err(e) => Outcome::failure(error_message(&e, "Failed to fetch vehicles.")),
        }
    }

    /// Fetch one vehicle
    pub async fn get(&self, id: i64) -> Outcome<Car> {
        let result = self.resource.get(id, RequestOptions::new()).await;
        reshape(result, OK, "Vehicle fetched.", "Could not fetch the vehicle.", |r| {
            r.entity_as()
        })
    }

    /// Register a vehicle
    pub async fn create(&self, draft: &CarDraft) -> Outcome<Car> {
        if let Err(errors) = draft.validate(chrono::Local::now().year()) {
            return Outcome::failure(errors.to_string());
        }
        let payload = draft.to_payload(&self.brand_key);
        let result = self.resource.create(&payload, RequestOptions::new()).await;
        reshape(result, CREATED, "Vehicle created successfully", "Failed to create vehicle.", |r| {
            r.payload_as()
        })
    }

    /// Update a vehicle
    pub async fn update(&self, id: i64, draft: &CarDraft) -> Outcome<Car> {
        if let Err(errors) = draft.validate(chrono::Local::now().year()) {
            return Outcome::failure(errors.to_string());
        }
        let payload = draft.to_payload(&self.brand_key);
        let result = self
            .resource
            .update(id, &payload, RequestOptions::new())
            .await;
        reshape(result, OK, "Vehicle updated successfully", "Failed to update vehicle.", |r| {
            r.payload_as()
        })
    }

    /// Remove a vehicle
    pub async fn delete(&self, id: i64) -> Outcome<()> {
        let result = self.resource.delete(id, RequestOptions::new()).await;
        reshape(result, OK, "Vehicle deleted successfully", "Failed to delete vehicle.", |_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn car(value: Value) -> Car {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_car_deserialize_lenient_numbers() {
        let c = car(json!({
            "id": 3,
            "modelo": "Fiesta",
            "anio": "2019",
            "precio_dia": "45.50",
            "marcaId": 2
        }));
        assert_eq!(c.model, "Fiesta");
        assert_eq!(c.year, Some(2019));
        assert_eq!(c.daily_price, Some(45.5));
        assert!(c.available);
        assert!(c.is_active);
        assert_eq!(c.brand_id(&BrandKey::default()), Some(2));
    }

    #[test]
    fn test_brand_id_uses_configured_key_only() {
        let c = car(json!({ "id": 1, "brandId": 9 }));
        assert_eq!(c.brand_id(&BrandKey::default()), None);
        assert_eq!(c.brand_id(&BrandKey::new("brandId")), Some(9));
    }

    #[test]
    fn test_brand_label_fallbacks() {
        let key = BrandKey::default();
        let names = HashMap::from([(2, "Ford".to_string())]);

        let embedded = car(json!({ "id": 1, "marcaId": 2, "Brand": { "nombre": "Toyota" } }));
        assert_eq!(embedded.brand_label(&key, &names), "Toyota");

        let mapped = car(json!({ "id": 1, "marcaId": 2 }));
        assert_eq!(mapped.brand_label(&key, &names), "Ford");

        let unknown = car(json!({ "id": 1, "marcaId": 5 }));
        assert_eq!(unknown.brand_label(&key, &names), "Brand #5");

        let plain = car(json!({ "id": 1, "marca": "Renault" }));
        assert_eq!(plain.brand_label(&key, &names), "Renault");

        let none = car(json!({ "id": 1 }));
        assert_eq!(none.brand_label(&key, &names), "No brand");
    }

    #[test]
    fn test_draft_validation() {
        let draft = CarDraft::default();
        let errors = draft.validate(2025).unwrap_err();
        assert!(errors.for_field("brand_id").is_some());
        assert!(errors.for_field("model").is_some());

        let draft = CarDraft {
            brand_id: Some(1),
            model: "Corolla".into(),
            year: Some(2027),
            daily_price: Some(-1.0),
            ..CarDraft::default()
        };
        let errors = draft.validate(2025).unwrap_err();
        assert!(errors.for_field("year").is_some());
        assert!(errors.for_field("daily_price").is_some());

        let draft = CarDraft {
            brand_id: Some(1),
            model: "Corolla".into(),
            year: Some(2026),
            daily_price: Some(0.0),
            ..CarDraft::default()
        };
        assert!(draft.validate(2025).is_ok());
    }

    #[test]
    fn test_payload_uses_brand_key() {
        let draft = CarDraft {
            brand_id: Some(4),
            model: " Clio ".into(),
            year: None,
            daily_price: Some(30.0),
            ..CarDraft::default()
        };
        let payload = draft.to_payload(&BrandKey::new("marca_id"));
        assert_eq!(
            payload,
            json!({
                "marca_id": 4,
                "modelo": "Clio",
                "precio_dia": 30.0,
                "disponible": true,
                "is_active": true
            })
        );
    }

    #[test]
    fn test_draft_from_car() {
        let c = car(json!({ "id": 1, "modelo": "Golf", "marcaId": 3, "disponible": false }));
        let draft = CarDraft::from_car(&c, &BrandKey::default());
        assert_eq!(draft.brand_id, Some(3));
        assert_eq!(draft.model, "Golf");
        assert!(!draft.available);
    }
}
