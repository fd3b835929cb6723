//! Client-side navigation seam
//!
//! The gateway forces the front end back to the login route when the
//! backend rejects the session. Front ends plug their router in here.

use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Route the gateway redirects to on 401/403
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Front-end router as seen by the gateway
pub trait Navigator: Send + Sync {
    /// Route currently displayed
    fn current_route(&self) -> String;

    /// Replace the current route
    fn navigate(&self, route: &str);
}

/// Navigator that only remembers where it is
///
/// Used by tests and by front ends without a real router.
#[derive(Debug)]
pub struct MemoryNavigator {
    route: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    /// Start at `route`
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: Mutex::new(route.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every route navigated to, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the last navigation went to the login route
    #[must_use]
    pub fn redirected_to_login(&self) -> bool {
        self.history().last().is_some_and(|r| r == LOGIN_ROUTE)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> String {
        self.route
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, route: &str) {
        info!(route, "Navigating");
        *self.route.lock().unwrap_or_else(PoisonError::into_inner) = route.to_string();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_navigator_records_history() {
        let nav = MemoryNavigator::new("/vehicles");
        assert_eq!(nav.current_route(), "/vehicles");
        assert!(!nav.redirected_to_login());

        nav.navigate(LOGIN_ROUTE);
        assert_eq!(nav.current_route(), LOGIN_ROUTE);
        assert_eq!(nav.history(), vec![LOGIN_ROUTE.to_string()]);
        assert!(nav.redirected_to_login());
    }
}
