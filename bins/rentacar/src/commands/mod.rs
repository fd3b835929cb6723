//! CLI command implementations

pub mod auth;
pub mod brands;
pub mod cars;
pub mod clients;
pub mod rentals;
