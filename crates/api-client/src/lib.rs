//! HTTP client for the car-rental backend
//!
//! This crate wraps the rental backend behind a single gateway that every
//! call goes through. The gateway attaches the stored bearer token, feeds a
//! shared loading counter, and normalizes both answers and failures so the
//! feature modules never deal with raw HTTP.
//!
//! # Features
//!
//! - **One gateway**: statuses below 500 resolve, except 401/403
//! - **Session expiry**: 401/403 clear the stored tokens and route to the login page
//! - **Loading bus**: a counter of in-flight calls with subscribable visibility
//! - **Resource clients**: list/get/create/update/delete for any base path
//! - **Typed feature modules**: auth, cars, brands, clients and rentals
//!
//! # Example
//!
//! ```rust,no_run
//! use rentacar_api_client::{ClientConfig, RentacarClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let client = RentacarClient::with_config(config)?;
//!
//!     let cars = client.cars().list(&[]).await;
//!     if cars.ok {
//!         println!("{} vehicles", cars.data.map_or(0, |c| c.len()));
//!     } else {
//!         eprintln!("{}", cars.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod loading;
pub mod navigation;
pub mod resource;
pub mod response;
pub mod session;
pub mod state;
pub mod validation;

pub use client::{ClientBuilder, RentacarClient, RequestOptions};
pub use config::{BrandKey, ClientConfig, Environment};
pub use error::{ApiError, ApiResult, FailureKind, GatewayResult, NormalizedError};
pub use loading::{LoadingBus, LoadingGuard, LoadingIndicator, Subscription};
pub use navigation::{MemoryNavigator, Navigator, LOGIN_ROUTE};
pub use resource::Resource;
pub use response::{NormalizedResponse, Outcome};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SessionTokens};
pub use state::{AuthSession, AuthStatus, CarsStore, Catalog, RentalsStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{RentacarClient, RequestOptions};
    pub use crate::config::{BrandKey, ClientConfig, Environment};
    pub use crate::endpoints::{
        AuthApi, Brand, BrandDraft, BrandsApi, Car, CarDraft, CarsApi, Client, ClientDraft,
        ClientsApi, Credentials, Rental, RentalDraft, RentalsApi,
    };
    pub use crate::error::{ApiError, ApiResult, FailureKind, NormalizedError};
    pub use crate::loading::{LoadingBus, LoadingIndicator};
    pub use crate::navigation::Navigator;
    pub use crate::response::{NormalizedResponse, Outcome};
    pub use crate::session::SessionTokens;
    pub use crate::state::{AuthSession, AuthStatus, CarsStore, RentalsStore};
}
