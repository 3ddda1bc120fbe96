//! Application State
//!
//! Everything the handlers share: the cart store, the notification hub, the
//! remote API client, the lookup caches and the booking service.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::booking::BookingService;
use crate::cart::CartStore;
use crate::config::Config;
use crate::lookups::Lookups;
use crate::notify::{NotificationCenter, Notifier};
use crate::storage::{FileStore, KeyValueStore};

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub cart: CartStore,
    pub notifications: Arc<NotificationCenter>,
    pub api: ApiClient,
    pub lookups: Lookups,
    pub booking: BookingService,
}

impl AppState {
    /// Builds the state with the cart persisted to `config.storage_path`.
    pub fn new(config: &Config) -> Self {
        let storage = Arc::new(FileStore::open(config.storage_path.clone()));
        tracing::info!(path = %config.storage_path.display(), "Using cart storage file");
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: &Config, storage: Arc<dyn KeyValueStore>) -> Self {
        let notifications = Arc::new(NotificationCenter::new());
        let notifier: Arc<dyn Notifier> = notifications.clone();
        let api = ApiClient::from_config(config);
        let lookups = Lookups::new(&api, config.cache_ttl);
        let booking =
            BookingService::new(api.clone(), notifier.clone(), lookups.booking_dependents());

        Self {
            cart: CartStore::load(storage, notifier),
            notifications,
            api,
            lookups,
            booking,
        }
    }
}
