//! Authentication endpoints
//!
//! Maps to the `auth` resource of the backend:
//! - `POST auth/login` with `{correo, password}`
//! - `GET auth/me`
//! - `POST auth/logout`
//! - `POST auth/refresh` with `{refresh}`

use crate::client::{RentacarClient, RequestOptions};
use crate::error::GatewayResult;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Base path of the auth resource
pub const AUTH_PATH: &str = "auth";

/// Authentication API interface
#[derive(Clone)]
pub struct AuthApi {
    client: RentacarClient,
    resource: Resource,
}

/// Login credentials, serialized with the backend's field names
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Account e-mail
    #[serde(rename = "correo")]
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Build credentials
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

impl AuthApi {
    /// Create a new auth API interface
    pub(crate) fn new(client: RentacarClient) -> Self {
        let resource = client.resource(AUTH_PATH, "Auth");
        Self { client, resource }
    }

    /// Sign in
    ///
    /// Posts to an absolute URL so it works even without a configured base
    /// URL, and stays off the loading bus.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> GatewayResult {
        let url = format!(
            "{}/{AUTH_PATH}/login",
            self.client.config().login_base_url().trim_end_matches('/')
        );
        let options = RequestOptions::new()
            .silent()
            .with_success_message("Signed in successfully");
        self.client.post(&url, Some(credentials), options).await
    }

    /// Fetch the signed-in user's profile
    pub async fn me(&self) -> GatewayResult {
        let path = format!("{AUTH_PATH}/me");
        self.client
            .get(&path, RequestOptions::new().with_success_message("Profile fetched"))
            .await
    }

    /// Close the session on the backend
    pub async fn logout(&self) -> GatewayResult {
        let path = format!("{AUTH_PATH}/logout");
        self.client
            .post(
                &path,
                Option::<&()>::None,
                RequestOptions::new().with_success_message("Session closed"),
            )
            .await
    }

    /// Exchange a refresh token for new session tokens
    pub async fn refresh(&self, refresh_token: &str) -> GatewayResult {
        self.resource
            .post(
                "refresh",
                Some(&RefreshRequest {
                    refresh: refresh_token,
                }),
                RequestOptions::new(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_wire_format() {
        let creds = Credentials::new("a@b.com", "x");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json, serde_json::json!({ "correo": "a@b.com", "password": "x" }));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.com", "secret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("secret"));
    }
}
