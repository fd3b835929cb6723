//! Front-end state holders
//!
//! These own what a UI keeps between actions: who is signed in, and the
//! last fetched lists of cars and rentals.

pub mod auth;
pub mod catalog;

pub use auth::{AuthSession, AuthStatus};
pub use catalog::{CarsStore, Catalog, Identified, RentalsStore};
