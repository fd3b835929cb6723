//! Terminal helpers for Rentacar tools
//!
//! Provides shared CLI functionality:
//! - Status messages and tables
//! - A spinner driven by the client's loading bus

#![warn(missing_docs)]

pub mod output;
pub mod progress;

pub use output::{OutputFormat, Status, Table};
pub use progress::LoadingSpinner;
