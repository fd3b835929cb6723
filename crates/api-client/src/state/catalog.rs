//! Cached lists of cars and rentals
//!
//! A [`Catalog`] mirrors what the backend returned last and is patched in
//! place after successful writes, so a listing stays current without a
//! refetch.

use crate::endpoints::{Car, CarDraft, CarsApi, Rental, RentalDraft, RentalsApi};
use crate::response::Outcome;
use tracing::debug;

/// Anything with a backend id
pub trait Identified {
    /// Backend id
    fn id(&self) -> i64;
}

impl Identified for Car {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Rental {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Last known list of records plus a loading flag
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    items: Vec<T>,
    loading: bool,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
        }
    }
}

impl<T: Identified> Catalog<T> {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current records
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Record by id
    #[must_use]
    pub fn find(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Replace everything with a fresh listing
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Newly created records go first
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Swap in an updated record; returns false when the id is unknown
    pub fn replace_by_id(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Drop a record; returns false when the id is unknown
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.items.clear();
        self.loading = false;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// Vehicle list kept in sync with [`CarsApi`] writes
pub struct CarsStore {
    api: CarsApi,
    catalog: Catalog<Car>,
}

impl CarsStore {
    /// Wrap the cars API
    #[must_use]
    pub fn new(api: CarsApi) -> Self {
        Self {
            api,
            catalog: Catalog::new(),
        }
    }

    /// Cached vehicles
    #[must_use]
    pub fn catalog(&self) -> &Catalog<Car> {
        &self.catalog
    }

    /// Underlying API
    #[must_use]
    pub fn api(&self) -> &CarsApi {
        &self.api
    }

    /// Reload the list; the cache is emptied on failure
    pub async fn fetch(&mut self, params: &[(String, String)]) -> Outcome<usize> {
        self.catalog.set_loading(true);
        let outcome = self.api.list(params).await;
        self.catalog.set_loading(false);

        let Outcome { ok, message, data } = outcome;
        if !ok {
            self.catalog.clear();
            return Outcome::failure(message);
        }
        let cars = data.unwrap_or_default();
        let count = cars.len();
        self.catalog.replace(cars);
        debug!(count, "Vehicle catalog refreshed");
        Outcome::success(message, Some(count))
    }

    /// Fetch one vehicle and refresh its cached copy
    pub async fn get(&mut self, id: i64) -> Outcome<Car> {
        let outcome = self.api.get(id).await;
        if let Some(car) = outcome.data.as_ref() {
            self.catalog.replace_by_id(car.clone());
        }
        outcome
    }

    /// Create a vehicle and put it at the top of the list
    pub async fn create(&mut self, draft: &CarDraft) -> Outcome<Car> {
        let outcome = self.api.create(draft).await;
        if let Some(car) = outcome.data.as_ref() {
            self.catalog.prepend(car.clone());
        }
        outcome
    }

    /// Update a vehicle and its cached copy
    pub async fn update(&mut self, id: i64, draft: &CarDraft) -> Outcome<Car> {
        let outcome = self.api.update(id, draft).await;
        if let Some(car) = outcome.data.as_ref() {
            self.catalog.replace_by_id(car.clone());
        }
        outcome
    }

    /// Delete a vehicle and drop it from the list
    pub async fn delete(&mut self, id: i64) -> Outcome<()> {
        let outcome = self.api.delete(id).await;
        if outcome.ok {
            self.catalog.remove(id);
        }
        outcome
    }
}

/// Rental list kept in sync with [`RentalsApi`] writes
pub struct RentalsStore {
    api: RentalsApi,
    catalog: Catalog<Rental>,
}

impl RentalsStore {
    /// Wrap the rentals API
    #[must_use]
    pub fn new(api: RentalsApi) -> Self {
        Self {
            api,
            catalog: Catalog::new(),
        }
    }

    /// Cached rentals
    #[must_use]
    pub fn catalog(&self) -> &Catalog<Rental> {
        &self.catalog
    }

    /// Reload the list; the cache is emptied on failure
    pub async fn fetch(&mut self, params: &[(String, String)]) -> Outcome<usize> {
        self.catalog.set_loading(true);
        let outcome = self.api.list(params).await;
        self.catalog.set_loading(false);

        if !outcome.ok {
            self.catalog.clear();
            return Outcome::failure(outcome.message);
        }
        let rentals = outcome.data.unwrap_or_default();
        let count = rentals.len();
        self.catalog.replace(rentals);
        Outcome::success(outcome.message, Some(count))
    }

    /// Fetch one rental and refresh its cached copy
    pub async fn get(&mut self, id: i64) -> Outcome<Rental> {
        let outcome = self.api.get(id).await;
        if let Some(rental) = outcome.data.as_ref() {
            self.catalog.replace_by_id(rental.clone());
        }
        outcome
    }

    /// Create a rental and put it at the top of the list
    pub async fn create(&mut self, draft: &RentalDraft) -> Outcome<Rental> {
        let outcome = self.api.create(draft).await;
        if let Some(rental) = outcome.data.as_ref() {
            self.catalog.prepend(rental.clone());
        }
        outcome
    }

    /// Update a rental and its cached copy
    pub async fn update(&mut self, id: i64, draft: &RentalDraft) -> Outcome<Rental> {
        let outcome = self.api.update(id, draft).await;
        if let Some(rental) = outcome.data.as_ref() {
            self.catalog.replace_by_id(rental.clone());
        }
        outcome
    }

    /// Delete a rental and drop it from the list
    pub async fn delete(&mut self, id: i64) -> Outcome<()> {
        let outcome = self.api.delete(id).await;
        if outcome.ok {
            self.catalog.remove(id);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        label: &'static str,
    }

    impl Identified for Row {
        fn id(&self) -> i64 {
            self.id
        }
    }

    fn row(id: i64, label: &'static str) -> Row {
        Row { id, label }
    }

    #[test]
    fn test_prepend_puts_new_first() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![row(1, "a"), row(2, "b")]);
        catalog.prepend(row(3, "c"));
        let ids: Vec<i64> = catalog.items().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_replace_by_id() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![row(1, "a"), row(2, "b")]);

        assert!(catalog.replace_by_id(row(2, "B")));
        assert_eq!(catalog.find(2).map(|r| r.label), Some("B"));
        assert!(!catalog.replace_by_id(row(9, "x")));
        assert_eq!(catalog.items().len(), 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![row(1, "a"), row(2, "b")]);

        assert!(catalog.remove(1));
        assert!(!catalog.remove(1));
        assert_eq!(catalog.items(), &[row(2, "b")]);

        catalog.set_loading(true);
        catalog.clear();
        assert!(catalog.items().is_empty());
        assert!(!catalog.loading());
    }
}
