//! Cached lookup lists
//!
//! One [`CachedSource`] per list endpoint, shared by the eager helpers used
//! for dropdowns and the infinite lists used for scrolled catalogs.

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use crate::api::models::{Branch, Doctor};
use crate::api::{
    ApiClient, ApiError, ApiSource, AvailableDoctorQuery, BranchQuery, ListEndpoint, PetQuery,
    ProductQuery,
};
use crate::pagination::{fetch_all, CachedSource, InfiniteList, Invalidate};

pub use handlers::routes;

/// A remote list endpoint behind a shared page cache.
pub type CachedList<Q> = Arc<CachedSource<ApiSource<Q>>>;

pub struct Lookups {
    branches: CachedList<BranchQuery>,
    doctors: CachedList<AvailableDoctorQuery>,
    pets: CachedList<PetQuery>,
    products: CachedList<ProductQuery>,
}

fn cached<Q: ListEndpoint>(client: &ApiClient, ttl: Duration) -> CachedList<Q> {
    Arc::new(CachedSource::new(ApiSource::new(client.clone()), ttl))
}

impl Lookups {
    pub fn new(client: &ApiClient, ttl: Duration) -> Self {
        Self {
            branches: cached(client, ttl),
            doctors: cached(client, ttl),
            pets: cached(client, ttl),
            products: cached(client, ttl),
        }
    }

    /// Every branch matching `query`, for a dropdown.
    pub async fn all_branches(&self, query: &BranchQuery) -> Result<Vec<Branch>, ApiError> {
        fetch_all(self.branches.as_ref(), query).await
    }

    /// Every doctor free for the slot. Empty until branch, date and time
    /// are all chosen.
    pub async fn available_doctors(
        &self,
        query: &AvailableDoctorQuery,
    ) -> Result<Vec<Doctor>, ApiError> {
        fetch_all(self.doctors.as_ref(), query).await
    }

    pub fn pet_list(&self, owner_id: Option<String>) -> InfiniteList<CachedList<PetQuery>> {
        InfiniteList::new(self.pets.clone(), PetQuery { owner_id })
    }

    pub fn product_list(&self, query: ProductQuery) -> InfiniteList<CachedList<ProductQuery>> {
        InfiniteList::new(self.products.clone(), query)
    }

    /// Caches made stale by a new appointment.
    pub fn booking_dependents(&self) -> Vec<Arc<dyn Invalidate>> {
        let doctors: Arc<dyn Invalidate> = self.doctors.clone();
        vec![doctors]
    }
}
