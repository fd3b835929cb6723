//! Generic CRUD client for one backend resource

use crate::client::{RentacarClient, RequestOptions};
use crate::error::GatewayResult;
use serde::Serialize;
use std::fmt::Display;

/// Thin CRUD wrapper over the gateway for a base path such as `Car`
///
/// Each call carries a success message derived from the human label, used
/// when the backend answers without a `message` field.
#[derive(Clone)]
pub struct Resource {
    client: RentacarClient,
    base_path: String,
    label: String,
}

impl Resource {
    /// Create a resource client for `base_path`
    pub(crate) fn new(client: RentacarClient, base_path: &str, label: &str) -> Self {
        Self {
            client,
            base_path: base_path.trim_matches('/').to_string(),
            label: label.to_string(),
        }
    }

    /// Base path of the resource
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Human readable label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Underlying gateway
    #[must_use]
    pub fn client(&self) -> &RentacarClient {
        &self.client
    }

    fn item_path(&self, id: impl Display) -> String {
        format!("{}/{id}", self.base_path)
    }

    fn message(&self, options: RequestOptions, suffix: &str) -> RequestOptions {
        if options.success_message.is_some() {
            return options;
        }
        options.with_success_message(format!("{}{suffix}", self.label))
    }

    /// GET `<base>`
    pub async fn list(&self, options: RequestOptions) -> GatewayResult {
        let options = self.message(options, "s fetched");
        self.client.get(&self.base_path, options).await
    }

    /// GET `<base>/<id>`
    pub async fn get(&self, id: impl Display, options: RequestOptions) -> GatewayResult {
        let options = self.message(options, " fetched");
        self.client.get(&self.item_path(id), options).await
    }

    /// POST `<base>`
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        payload: &B,
        options: RequestOptions,
    ) -> GatewayResult {
        let options = self.message(options, " created");
        self.client
            .post(&self.base_path, Some(payload), options)
            .await
    }

    /// PUT `<base>/<id>`
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: impl Display,
        payload: &B,
        options: RequestOptions,
    ) -> GatewayResult {
        let options = self.message(options, " updated");
        self.client.put(&self.item_path(id), payload, options).await
    }

    /// DELETE `<base>/<id>`
    pub async fn delete(&self, id: impl Display, options: RequestOptions) -> GatewayResult {
        let options = self.message(options, " deleted");
        self.client.delete(&self.item_path(id), options).await
    }

    /// POST `<base>/<sub_path>`, for action endpoints like `refresh`
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        sub_path: &str,
        payload: Option<&B>,
        options: RequestOptions,
    ) -> GatewayResult {
        let options = self.message(options, " sent");
        let path = format!("{}/{}", self.base_path, sub_path.trim_start_matches('/'));
        self.client.post(&path, payload, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn resource() -> Resource {
        let client = RentacarClient::with_config(ClientConfig::development()).unwrap();
        client.resource("/rentals/", "Rental")
    }

    #[test]
    fn test_paths() {
        let rentals = resource();
        assert_eq!(rentals.base_path(), "rentals");
        assert_eq!(rentals.item_path(4), "rentals/4");
        assert_eq!(rentals.label(), "Rental");
    }

    #[test]
    fn test_success_message_from_label() {
        let rentals = resource();
        let options = rentals.message(RequestOptions::new(), "s fetched");
        assert_eq!(options.success_message.as_deref(), Some("Rentals fetched"));

        let custom = rentals.message(RequestOptions::new().with_success_message("x"), " created");
        assert_eq!(custom.success_message.as_deref(), Some("x"));
    }

    #[test]
    fn test_list_without_base_url_is_network_failure() {
        let client = RentacarClient::with_config(ClientConfig::default()).unwrap();
        let brands = client.resource("brands", "Brand");
        let err = tokio_test::block_on(brands.list(RequestOptions::new())).unwrap_err();
        assert_eq!(err.kind, crate::error::FailureKind::Network);
        assert_eq!(client.loading_bus().count(), 0);
    }
}
