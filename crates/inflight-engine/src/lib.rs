//! Reservation engine of the inFlight station
//!
//! The engine consists of the [record store][store], the per-entity
//! [lock table][locks], the [domain services][services], the [signal
//! registers][signals] and the [dispatcher] that maps protocol actions onto
//! them. [`launch()`] wires everything together.

use std::sync::Arc;

use inflight_core::Config;
use tracing::info;

mod database;
mod dispatcher;
mod error;
mod locks;
mod routes;
mod seed;
pub mod services;
mod signals;
pub mod store;

pub use database::Database;
pub use dispatcher::{DispatchError, Dispatcher, Services};
pub use error::{ServiceError, ServiceResult};
pub use locks::{LockKey, LockTable};
pub use seed::{Seed, SeedError, SeedPhotographer, SeedSlot};
pub use signals::{Broadcast, Cancellation, Signals};

/// Entrypoint of the engine
///
/// Loads the seed file named in the configuration, if any, and returns a
/// dispatcher ready to be served requests.
pub fn launch(config: &Config) -> Result<Dispatcher, SeedError> {
    let seed = match &config.seed {
        Some(path) => Seed::load(path)?,
        None => Seed::default(),
    };
    launch_with_seed(config, &seed)
}

/// Like [`launch()`], with the initial records given directly
pub fn launch_with_seed(config: &Config, seed: &Seed) -> Result<Dispatcher, SeedError> {
    let store = Arc::new(Database::new());
    seed.apply(store.as_ref())?;
    Ok(assemble(store, config))
}

fn assemble(store: Arc<dyn store::RecordStore>, config: &Config) -> Dispatcher {
    let locks = Arc::new(LockTable::new());
    let signals = Arc::new(Signals::new());
    let ledger = Arc::new(services::Ledger::new(store.clone(), locks.clone()));
    let slots = Arc::new(services::SlotRegistry::new(store.clone()));
    let bookings = services::BookingService::new(
        store.clone(),
        locks,
        ledger.clone(),
        slots.clone(),
        signals.clone(),
        config.cancellation_refund,
    );
    let services = Services {
        passengers: services::PassengerDirectory::new(store.clone()),
        ledger,
        slots,
        bookings,
        chat: services::ChatService::new(store.clone()),
        inventory: services::InventoryService::new(store.clone()),
        photographers: services::PhotographerRegistry::new(store),
    };
    info!(refund_policy = ?config.cancellation_refund, "engine ready");
    Dispatcher::new(services, signals)
}
