//! Progress indicators
//!
//! Provides a spinner that follows the API client's loading bus.

use indicatif::{ProgressBar, ProgressStyle};
use rentacar_api_client::{LoadingBus, LoadingIndicator};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate progress
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner().tick_chars(TICK_CHARS);
    pb.set_style(
        style
            .clone()
            .template("{spinner:.blue} {msg}")
            .unwrap_or(style),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Terminal spinner shown while the loading bus reports work in flight
pub struct LoadingSpinner {
    indicator: LoadingIndicator,
    current: Arc<Mutex<Option<ProgressBar>>>,
}

impl LoadingSpinner {
    /// Attach to `bus`, labelling the spinner with `message`
    pub fn attach(bus: &LoadingBus, message: impl Into<String>) -> Self {
        let message = message.into();
        let current: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&current);

        let indicator = LoadingIndicator::attach(bus, move |visible| {
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if visible {
                if slot.is_none() {
                    *slot = Some(spinner(&message));
                }
            } else if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        });

        Self { indicator, current }
    }

    /// Whether the spinner is on screen
    pub fn is_visible(&self) -> bool {
        self.indicator.is_visible()
    }

    /// Clear the spinner now, whatever the bus says
    pub fn clear(&self) {
        let pending = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pb) = pending {
            pb.finish_and_clear();
        }
    }
}

impl Drop for LoadingSpinner {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_creation() {
        let pb = spinner("Testing...");
        pb.finish();
    }

    #[tokio::test]
    async fn test_spinner_follows_bus() {
        let bus = LoadingBus::new();
        let spinner = LoadingSpinner::attach(&bus, "Loading");
        assert!(!spinner.is_visible());

        bus.increment();
        bus.increment();
        assert!(spinner.is_visible());

        bus.decrement();
        assert!(spinner.is_visible());

        bus.decrement();
        assert!(!spinner.is_visible());
        assert!(spinner.current.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_drop_detaches_from_bus() {
        let bus = LoadingBus::new();
        {
            let _spinner = LoadingSpinner::attach(&bus, "Loading");
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }
}
