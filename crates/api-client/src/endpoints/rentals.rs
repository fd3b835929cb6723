//! Rental endpoints
//!
//! The backend exposes rentals under `rentals` (lowercase, plural).

use super::{lenient, reshape, CREATED, OK};
use crate::client::{RentacarClient, RequestOptions};
use crate::resource::Resource;
use crate::response::{body_message, decode_items, error_message, extract_items, Outcome};
use crate::session::SessionTokens;
use crate::validation::ValidationErrors;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Base path of the rentals resource
pub const RENTALS_PATH: &str = "rentals";

/// Returned without calling the backend when no session is stored
pub const SIGN_IN_REQUIRED_MESSAGE: &str = "You must sign in to create a rental.";

/// Returned when the backend has no rentals route
pub const ENDPOINT_MISSING_MESSAGE: &str =
    "The /rentals endpoint does not exist on the backend. Check the server routes.";

/// Returned when the backend rejects the session on create
pub const TOKEN_REQUIRED_MESSAGE: &str = "Token required. Please sign in again.";

/// Rentals API interface
#[derive(Clone)]
pub struct RentalsApi {
    resource: Resource,
    session: SessionTokens,
}

/// Rental contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    /// Backend id
    pub id: i64,
    /// Rented car
    #[serde(rename = "carId", default, deserialize_with = "lenient::i64_opt")]
    pub car_id: Option<i64>,
    /// Renting client
    #[serde(rename = "clientId", default, deserialize_with = "lenient::i64_opt")]
    pub client_id: Option<i64>,
    /// First day
    #[serde(rename = "fecha_inicio", deserialize_with = "lenient::date")]
    pub start: NaiveDate,
    /// Last day
    #[serde(rename = "fecha_fin", deserialize_with = "lenient::date")]
    pub end: NaiveDate,
}

impl Rental {
    /// Number of calendar days covered, both ends included
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Rental form contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentalDraft {
    /// Selected client
    pub client_id: Option<i64>,
    /// Selected car
    pub car_id: Option<i64>,
    /// First day
    pub start: Option<NaiveDate>,
    /// Last day
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct RentalPayload {
    #[serde(rename = "carId")]
    car_id: i64,
    #[serde(rename = "clientId")]
    client_id: i64,
    fecha_inicio: NaiveDate,
    fecha_fin: NaiveDate,
}

impl RentalDraft {
    /// Check the form; `today` bounds the start date
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.client_id.is_none(), "client_id", "A client must be selected");
        errors.check(self.car_id.is_none(), "car_id", "A vehicle must be selected");

        match self.start {
            None => errors.add("start", "Start date is required"),
            Some(start) => errors.check(start < today, "start", "Start date must be today or later"),
        }
        match (self.start, self.end) {
            (_, None) => errors.add("end", "End date is required"),
            (Some(start), Some(end)) => {
                errors.check(end < start, "end", "End date must not be before the start date");
            }
            (None, Some(_)) => {}
        }
        errors.into_result()
    }

    fn payload(&self) -> Option<RentalPayload> {
        Some(RentalPayload {
            car_id: self.car_id?,
            client_id: self.client_id?,
            fecha_inicio: self.start?,
            fecha_fin: self.end?,
        })
    }
}

impl RentalsApi {
    /// Create a new rentals API interface
    pub(crate) fn new(client: RentacarClient) -> Self {
        let session = client.session().clone();
        Self {
            resource: client.resource(RENTALS_PATH, "Rental"),
            session,
        }
    }

    /// List rentals
    pub async fn list(&self, params: &[(String, String)]) -> Outcome<Vec<Rental>> {
        let options = RequestOptions::new().with_query_pairs(params.iter().cloned());
        let result = self.resource.list(options).await;
        reshape(result, OK, "Rental list fetched.", "Failed to fetch rentals.", |r| {
            Some(decode_items(extract_items(&r.data)))
        })
    }

    /// Fetch one rental
    pub async fn get(&self, id: i64) -> Outcome<Rental> {
        let result = self.resource.get(id, RequestOptions::new()).await;
        reshape(result, OK, "Rental fetched.", "Could not fetch the rental.", |r| {
            r.entity_as()
        })
    }

    /// Create a rental, checking the session and the form first
    pub async fn create(&self, draft: &RentalDraft) -> Outcome<Rental> {
        self.create_on(draft, chrono::Local::now().date_naive()).await
    }

    /// Create a rental, with `today` supplied by the caller
    pub async fn create_on(&self, draft: &RentalDraft, today: NaiveDate) -> Outcome<Rental> {
        if !self.session.has_bearer() {
            return Outcome::failure(SIGN_IN_REQUIRED_MESSAGE);
        }
        if let Err(errors) = draft.validate(today) {
            return Outcome::failure(errors.to_string());
        }
        let Some(payload) = draft.payload() else {
            return Outcome::failure("Rental form is incomplete");
        };

        match self.resource.create(&payload, RequestOptions::new()).await {
            Ok(response) if response.status == 404 => {
                warn!("Rentals endpoint missing on backend");
                Outcome::failure(body_message(&response.data).unwrap_or(ENDPOINT_MISSING_MESSAGE))
            }
            Err(e) if e.kind.is_auth() => {
                Outcome::failure(error_message(&e, TOKEN_REQUIRED_MESSAGE))
            }
            result => reshape(result, CREATED, "Rental created successfully", "Failed to create rental.", |r| {
                r.payload_as()
            }),
        }
    }

    /// Change a rental's dates or parties
    pub async fn update(&self, id: i64, draft: &RentalDraft) -> Outcome<Rental> {
        let Some(payload) = draft.payload() else {
            return Outcome::failure("Rental form is incomplete");
        };
        let result = self
            .resource
            .update(id, &payload, RequestOptions::new())
            .await;
        reshape(result, OK, "Rental updated successfully", "Failed to update rental.", |r| {
            r.payload_as()
        })
    }

    /// Remove a rental
    pub async fn delete(&self, id: i64) -> Outcome<()> {
        let result = self.resource.delete(id, RequestOptions::new()).await;
        reshape(result, OK, "Rental deleted successfully", "Failed to delete rental.", |_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_rental_deserialize_datetime_strings() {
        let rental: Rental = serde_json::from_value(json!({
            "id": 1,
            "carId": 3,
            "clientId": "4",
            "fecha_inicio": "2025-05-01T00:00:00.000Z",
            "fecha_fin": "2025-05-03"
        }))
        .unwrap();
        assert_eq!(rental.client_id, Some(4));
        assert_eq!(rental.start, date("2025-05-01"));
        assert_eq!(rental.days(), 3);
    }

    #[test]
    fn test_draft_validation() {
        let today = date("2025-05-10");
        let errors = RentalDraft::default().validate(today).unwrap_err();
        for field in ["client_id", "car_id", "start", "end"] {
            assert!(errors.for_field(field).is_some(), "{field}");
        }

        let past = RentalDraft {
            client_id: Some(1),
            car_id: Some(2),
            start: Some(date("2025-05-09")),
            end: Some(date("2025-05-08")),
        };
        let errors = past.validate(today).unwrap_err();
        assert!(errors.for_field("start").is_some());
        assert!(errors.for_field("end").is_some());

        let same_day = RentalDraft {
            start: Some(today),
            end: Some(today),
            ..past
        };
        assert!(same_day.validate(today).is_ok());
    }

    #[test]
    fn test_payload_wire_format() {
        let draft = RentalDraft {
            client_id: Some(7),
            car_id: Some(3),
            start: Some(date("2025-06-01")),
            end: Some(date("2025-06-05")),
        };
        assert_eq!(
            serde_json::to_value(draft.payload().unwrap()).unwrap(),
            json!({
                "carId": 3,
                "clientId": 7,
                "fecha_inicio": "2025-06-01",
                "fecha_fin": "2025-06-05"
            })
        );
        assert!(RentalDraft::default().payload().is_none());
    }
}
