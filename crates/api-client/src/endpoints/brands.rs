//! Brand endpoints

use super::{reshape, CREATED, OK};
use crate::client::{RentacarClient, RequestOptions};
use crate::resource::Resource;
use crate::response::{decode_items, extract_items, Outcome};
use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base path of the brands resource
pub const BRANDS_PATH: &str = "brands";

/// Brands API interface
#[derive(Clone)]
pub struct BrandsApi {
    resource: Resource,
}

/// Vehicle brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// Backend id
    pub id: i64,
    /// Display name (`nombre`, `name` or `marca` on the wire)
    #[serde(rename = "nombre", alias = "name", alias = "marca", default)]
    pub name: String,
}

impl Brand {
    /// Name to show, never empty
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Brand {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

/// Id → display name lookup used to label cars
#[must_use]
pub fn name_map(brands: &[Brand]) -> HashMap<i64, String> {
    brands.iter().map(|b| (b.id, b.display_name())).collect()
}

/// Brand form contents
#[derive(Debug, Clone, Default)]
pub struct BrandDraft {
    /// Brand name
    pub name: String,
}

#[derive(Serialize)]
struct BrandPayload<'a> {
    nombre: &'a str,
}

impl BrandDraft {
    /// Create a draft
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "Brand name is required");
        errors.into_result()
    }

    fn payload(&self) -> BrandPayload<'_> {
        BrandPayload {
            nombre: self.name.trim(),
        }
    }
}

impl BrandsApi {
    /// Create a new brands API interface
    pub(crate) fn new(client: RentacarClient) -> Self {
        Self {
            resource: client.resource(BRANDS_PATH, "Brand"),
        }
    }

    /// List all brands
    pub async fn list(&self) -> Outcome<Vec<Brand>> {
        let result = self.resource.list(RequestOptions::new()).await;
        reshape(result, OK, "Brands fetched", "Could not load brands", |r| {
            Some(decode_items(extract_items(&r.data)))
        })
    }

    /// Fetch one brand
    pub async fn get(&self, id: i64) -> Outcome<Brand> {
        let result = self.resource.get(id, RequestOptions::new()).await;
        reshape(result, OK, "Brand fetched", "Could not load the brand", |r| {
            r.entity_as()
        })
    }

    /// Register a brand
    pub async fn create(&self, draft: &BrandDraft) -> Outcome<Brand> {
        if let Err(errors) = draft.validate() {
            return Outcome::failure(errors.to_string());
        }
        let result = self
            .resource
            .create(&draft.payload(), RequestOptions::new())
            .await;
        reshape(result, CREATED, "Brand created", "Failed to create brand", |r| {
            r.payload_as()
        })
    }

    /// Rename a brand
    pub async fn update(&self, id: i64, draft: &BrandDraft) -> Outcome<Brand> {
        if let Err(errors) = draft.validate() {
            return Outcome::failure(errors.to_string());
        }
        let result = self
            .resource
            .update(id, &draft.payload(), RequestOptions::new())
            .await;
        reshape(result, OK, "Brand updated", "Failed to update brand", |r| {
            r.payload_as()
        })
    }

    /// Remove a brand
    pub async fn delete(&self, id: i64) -> Outcome<()> {
        let result = self.resource.delete(id, RequestOptions::new()).await;
        reshape(result, OK, "Brand deleted", "Failed to delete brand", |_| None)
    }
}
