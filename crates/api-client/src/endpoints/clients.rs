//! Client (customer) endpoints

use super::{lenient, reshape, CREATED, OK};
use crate::client::{RentacarClient, RequestOptions};
use crate::resource::Resource;
use crate::response::{decode_items, extract_items, Outcome};
use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};

/// Base path of the clients resource
pub const CLIENTS_PATH: &str = "clients";

/// Clients API interface
#[derive(Clone)]
pub struct ClientsApi {
    resource: Resource,
}

/// Rental customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Backend id
    pub id: i64,
    /// First name
    #[serde(rename = "nombre", default)]
    pub first_name: String,
    /// Last name
    #[serde(rename = "apellido", default)]
    pub last_name: String,
    /// Identity document number
    #[serde(rename = "documento", default, deserialize_with = "lenient::string")]
    pub document: String,
    /// Contact e-mail
    #[serde(rename = "correo", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Soft-delete flag
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Client {
    /// `First Last (document)`
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} {} ({})", self.first_name, self.last_name, self.document)
    }
}

/// Clients that may be picked for a new rental
pub fn selectable(clients: &[Client]) -> impl Iterator<Item = &Client> {
    clients.iter().filter(|c| c.is_active)
}

/// Client form contents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientDraft {
    /// First name
    #[serde(rename = "nombre")]
    pub first_name: String,
    /// Last name
    #[serde(rename = "apellido")]
    pub last_name: String,
    /// Identity document number
    #[serde(rename = "documento")]
    pub document: String,
    /// Contact e-mail
    #[serde(rename = "correo", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ClientDraft {
    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.first_name.trim().is_empty(), "first_name", "First name is required");
        errors.check(self.last_name.trim().is_empty(), "last_name", "Last name is required");
        errors.check(self.document.trim().is_empty(), "document", "Document is required");
        if let Some(ref email) = self.email {
            errors.check(!email.contains('@'), "email", "E-mail is not valid");
        }
        errors.into_result()
    }

    fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            document: self.document.trim().to_string(),
            email: self.email.as_ref().map(|e| e.trim().to_string()),
            phone: self.phone.as_ref().map(|p| p.trim().to_string()),
        }
    }
}

impl ClientsApi {
    /// Create a new clients API interface
    pub(crate) fn new(client: RentacarClient) -> Self {
        Self {
            resource: client.resource(CLIENTS_PATH, "Client"),
        }
    }

    /// List all clients
    pub async fn list(&self) -> Outcome<Vec<Client>> {
        let result = self.resource.list(RequestOptions::new()).await;
        reshape(result, OK, "Client list fetched.", "Could not load clients.", |r| {
            Some(decode_items(extract_items(&r.data)))
        })
    }

    /// Fetch one client
    pub async fn get(&self, id: i64) -> Outcome<Client> {
        let result = self.resource.get(id, RequestOptions::new()).await;
        reshape(result, OK, "Client fetched.", "Could not load the client.", |r| {
            r.entity_as()
        })
    }

    /// Register a client
    pub async fn create(&self, draft: &ClientDraft) -> Outcome<Client> {
        if let Err(errors) = draft.validate() {
            return Outcome::failure(errors.to_string());
        }
        let result = self
            .resource
            .create(&draft.trimmed(), RequestOptions::new())
            .await;
        reshape(result, CREATED, "Client created successfully", "Failed to create client.", |r| {
            r.payload_as()
        })
    }

    /// Update a client
    pub async fn update(&self, id: i64, draft: &ClientDraft) -> Outcome<Client> {
        if let Err(errors) = draft.validate() {
            return Outcome::failure(errors.to_string());
        }
        let result = self
            .resource
            .update(id, &draft.trimmed(), RequestOptions::new())
            .await;
        reshape(result, OK, "Client updated successfully", "Failed to update client.", |r| {
            r.payload_as()
        })
    }

    /// Remove a client
    pub async fn delete(&self, id: i64) -> Outcome<()> {
        let result = self.resource.delete(id, RequestOptions::new()).await;
        reshape(result, OK, "Client deleted successfully", "Failed to delete client.", |_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_deserialize() {
        let client: Client = serde_json::from_value(json!({
            "id": 5,
            "nombre": "Ana",
            "apellido": "Paz",
            "documento": 30111222,
            "is_active": false
        }))
        .unwrap();
        assert_eq!(client.document, "30111222");
        assert_eq!(client.display_label(), "Ana Paz (30111222)");
        assert!(!client.is_active);
    }

    #[test]
    fn test_selectable_skips_inactive() {
        let active: Client =
            serde_json::from_value(json!({ "id": 1, "nombre": "A", "apellido": "B", "documento": "1" }))
                .unwrap();
        let inactive = Client {
            id: 2,
            is_active: false,
            ..active.clone()
        };
        let clients = vec![active, inactive];
        let ids: Vec<i64> = selectable(&clients).map(|c| c.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_draft_validation_and_wire_names() {
        let draft = ClientDraft {
            first_name: " Ana ".into(),
            last_name: "Paz".into(),
            document: "30111222".into(),
            email: Some("ana@example.com".into()),
            phone: None,
        };
        assert!(draft.validate().is_ok());
        assert_eq!(
            serde_json::to_value(draft.trimmed()).unwrap(),
            json!({ "nombre": "Ana", "apellido": "Paz", "documento": "30111222", "correo": "ana@example.com" })
        );

        let errors = ClientDraft::default().validate().unwrap_err();
        assert_eq!(errors.errors().len(), 3);
    }
}
