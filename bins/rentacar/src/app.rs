//! Shared command context
//!
//! Builds one [`RentacarClient`] per invocation with a file-backed session,
//! a navigator that tells the user to sign in again, and a spinner on the
//! loading bus.

use crate::settings::Settings;
use anyhow::{bail, Result};
use rentacar_api_client::{
    FileSessionStore, MemoryNavigator, Navigator, Outcome, RentacarClient, SessionTokens, LOGIN_ROUTE,
};
use rentacar_cli::{LoadingSpinner, OutputFormat, Status};
use serde::Serialize;
use std::sync::Arc;

/// Router stand-in for a terminal: remembers the route and explains redirects
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    inner: MemoryNavigator,
}

impl TerminalNavigator {
    /// Start at `route`; a command that is itself the sign-in page starts at [`LOGIN_ROUTE`]
    pub fn at(route: &str) -> Self {
        Self {
            inner: MemoryNavigator::new(route),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_route(&self) -> String {
        self.inner.current_route()
    }

    fn navigate(&self, route: &str) {
        if route == LOGIN_ROUTE {
            Status::warning("Your session is no longer valid. Run `rentacar login` to sign in again.");
        }
        self.inner.navigate(route);
    }
}

/// Everything a command needs
pub struct App {
    /// Configured gateway
    pub client: RentacarClient,
    /// Requested output format
    pub format: OutputFormat,
    _spinner: Option<LoadingSpinner>,
}

impl App {
    /// Build the client from settings and environment, with the navigator at `route`
    pub fn new(settings: &Settings, format: OutputFormat, route: &str) -> Result<Self> {
        let config = settings.client_config()?;
        let session_path = settings.session_path()?;
        tracing::debug!(session = %session_path.display(), base_url = ?config.base_url, "Building client");

        let session = SessionTokens::new(Arc::new(FileSessionStore::new(session_path)));
        let client = RentacarClient::builder(config)
            .session(session)
            .navigator(Arc::new(TerminalNavigator::at(route)))
            .build()?;

        let spinner = (format == OutputFormat::Text && console::Term::stderr().is_term())
            .then(|| LoadingSpinner::attach(client.loading_bus(), "Contacting backend..."));

        Ok(Self {
            client,
            format,
            _spinner: spinner,
        })
    }

    /// Whether output should be JSON
    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Turn a failed outcome into an error, pass the rest through
    pub fn require<T>(outcome: Outcome<T>) -> Result<Outcome<T>> {
        if !outcome.ok {
            bail!("{}", outcome.message);
        }
        Ok(outcome)
    }

    /// Print the outcome message, or the payload as JSON
    pub fn report<T: Serialize>(&self, outcome: Outcome<T>) -> Result<()> {
        let outcome = Self::require(outcome)?;
        if self.json() {
            rentacar_cli::output::print_json(&outcome)?;
        } else {
            Status::success(&outcome.message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_fails_with_message() {
        let err = App::require(Outcome::<()>::failure("Failed to fetch vehicles.")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch vehicles.");
        assert!(App::require(Outcome::success("ok", Some(1))).is_ok());
    }

    #[test]
    fn test_terminal_navigator_tracks_route() {
        let navigator = TerminalNavigator::default();
        assert_eq!(navigator.current_route(), "/");
        navigator.navigate(LOGIN_ROUTE);
        assert_eq!(navigator.current_route(), LOGIN_ROUTE);
        assert!(navigator.inner.redirected_to_login());
    }

    #[test]
    fn test_terminal_navigator_starts_at_route() {
        let navigator = TerminalNavigator::at(LOGIN_ROUTE);
        assert_eq!(navigator.current_route(), LOGIN_ROUTE);
        assert!(navigator.inner.history().is_empty());
    }
}
