//! Authentication state holder

use crate::client::RentacarClient;
use crate::endpoints::auth::Credentials;
use crate::error::NETWORK_MESSAGE;
use crate::response::{error_message, str_field, NormalizedResponse, Outcome};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Where the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Not yet checked against the backend
    Loading,
    /// Signed in, profile fetched
    Authenticated,
    /// No usable session
    Unauthenticated,
}

/// Signed-in user and session lifecycle
pub struct AuthSession {
    client: RentacarClient,
    status: AuthStatus,
    user: Option<Value>,
}

impl AuthSession {
    /// Start in [`AuthStatus::Loading`]
    #[must_use]
    pub fn new(client: RentacarClient) -> Self {
        Self {
            client,
            status: AuthStatus::Loading,
            user: None,
        }
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.status
    }

    /// Profile of the signed-in user
    #[must_use]
    pub fn user(&self) -> Option<&Value> {
        self.user.as_ref()
    }

    /// Whether a profile has been fetched for the stored session
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    /// Resolve the initial status from the stored session
    pub async fn init(&mut self) -> AuthStatus {
        if self.client.session().has_bearer() {
            self.fetch_user().await;
        } else {
            self.status = AuthStatus::Unauthenticated;
        }
        self.status
    }

    /// Load the profile for the stored token; drops the session on failure
    pub async fn fetch_user(&mut self) -> Outcome<Value> {
        match self.client.auth().me().await {
            Ok(response) if response.status == 200 => {
                let user = response
                    .payload()
                    .cloned()
                    .unwrap_or_else(|| response.data.clone());
                debug!("Profile loaded");
                self.user = Some(user.clone());
                self.status = AuthStatus::Authenticated;
                Outcome::success(response.message, Some(user))
            }
            Ok(response) => {
                let message = str_field(&response.data, "message").map_or_else(
                    || format!("Error {}: Profile unavailable", response.status),
                    String::from,
                );
                self.drop_session();
                Outcome::failure(message)
            }
            Err(e) => {
                self.drop_session();
                Outcome::failure(error_message(&e, NETWORK_MESSAGE))
            }
        }
    }

    /// Sign in, store the returned tokens and load the profile
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Outcome<()> {
        let response = match self.client.auth().login(credentials).await {
            Ok(response) => response,
            Err(e) => return Outcome::failure(error_message(&e, NETWORK_MESSAGE)),
        };

        if !response.has_status(&[200, 201]) {
            let message = str_field(&response.data, "message")
                .or_else(|| str_field(&response.data, "detail"))
                .map_or_else(
                    || format!("Error {}: Sign-in failed", response.status),
                    String::from,
                );
            warn!(status = response.status, "Sign-in rejected");
            return Outcome::failure(message);
        }

        if let Err(e) = self.store_tokens(&response) {
            return Outcome::failure(e);
        }

        self.fetch_user().await;
        info!("Signed in");
        Outcome::success(response.message, None)
    }

    /// Close the session; local state is cleared even if the call fails
    pub async fn sign_out(&mut self) {
        if let Err(e) = self.client.auth().logout().await {
            warn!(error = %e, "Logout call failed");
        }
        self.drop_session();
        info!("Signed out");
    }

    /// Trade the refresh token for new tokens
    ///
    /// Returns `None` when there is no refresh token or the backend refused.
    pub async fn refresh_session(&mut self) -> Option<NormalizedResponse> {
        let refresh = self.client.session().refresh_token()?;
        match self.client.auth().refresh(&refresh).await {
            Ok(response) if (200..300).contains(&response.status) => {
                if let Err(e) = self.store_tokens(&response) {
                    warn!(error = %e, "Could not store refreshed tokens");
                }
                Some(response)
            }
            Ok(response) => {
                warn!(status = response.status, "Token refresh refused");
                self.drop_session();
                None
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.drop_session();
                None
            }
        }
    }

    // Tokens come at the top level of the body; some backends wrap them in `data`.
    fn store_tokens(&self, response: &NormalizedResponse) -> Result<(), String> {
        let session = self.client.session();
        let written = session
            .save(&response.data)
            .map_err(|e| format!("Could not store the session: {e}"))?;
        if written == 0 {
            if let Some(inner) = response.payload() {
                session
                    .save(inner)
                    .map_err(|e| format!("Could not store the session: {e}"))?;
            }
        }
        Ok(())
    }

    fn drop_session(&mut self) {
        if let Err(e) = self.client.session().clear() {
            warn!(error = %e, "Failed to clear session tokens");
        }
        self.user = None;
        self.status = AuthStatus::Unauthenticated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[tokio::test]
    async fn test_init_without_token_is_unauthenticated() {
        let client = RentacarClient::with_config(ClientConfig::development()).unwrap();
        let mut session = AuthSession::new(client);
        assert_eq!(session.status(), AuthStatus::Loading);

        assert_eq!(session.init().await, AuthStatus::Unauthenticated);
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_none() {
        let client = RentacarClient::with_config(ClientConfig::development()).unwrap();
        let mut session = AuthSession::new(client);
        assert!(session.refresh_session().await.is_none());
    }
}
