//! Interface of the durable record store

use inflight_core::{
    Booking, BookingId, BookingStatus, ChatMessage, Credits, InventoryItem, ItemId, Passenger,
    PassengerId, Photographer, PhotographerId, Slot, SlotId, Tier, UserRole,
};
use serde::Deserialize;
use thiserror::Error;

/// Failures of the record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No further ids can be handed out for the table
    #[error("{table} id space exhausted")]
    IdsExhausted {
        /// Affected table
        table: &'static str,
    },
    /// A natural key is already taken
    #[error("duplicate {table} key `{key}`")]
    Duplicate {
        /// Affected table
        table: &'static str,
        /// The conflicting key
        key: String,
    },
}

/// Result type of [`RecordStore`] operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A passenger to register
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NewPassenger {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub nova_credits: Credits,
}

impl NewPassenger {
    pub fn new(username: impl Into<String>, nova_credits: Credits) -> Self {
        Self {
            username: username.into(),
            password: String::new(),
            nova_credits,
        }
    }
}

/// An inventory item to register
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default = "available_by_default")]
    pub available: bool,
    pub owner_role: UserRole,
}

fn available_by_default() -> bool {
    true
}

/// A booking to insert
#[derive(Clone, Copy, Debug)]
pub struct NewBooking {
    pub passenger_id: PassengerId,
    pub slot_id: SlotId,
    pub tier: Tier,
    pub status: BookingStatus,
}

/// Per-entity access to durable storage
///
/// Every method is a single read or a single write; the store gives no
/// isolation across calls. Setters return `false` when the record does not
/// exist.
pub trait RecordStore: Send + Sync {
    fn insert_passenger(&self, passenger: NewPassenger) -> StoreResult<Passenger>;
    fn passenger(&self, id: PassengerId) -> StoreResult<Option<Passenger>>;
    fn passenger_by_username(&self, username: &str) -> StoreResult<Option<Passenger>>;
    fn passengers(&self) -> StoreResult<Vec<Passenger>>;
    fn set_nova_credits(&self, id: PassengerId, credits: Credits) -> StoreResult<bool>;
    fn set_passenger_checked_out(&self, id: PassengerId, checked_out: bool) -> StoreResult<bool>;

    fn insert_slot(&self, slot_time: String) -> StoreResult<Slot>;
    fn slot(&self, id: SlotId) -> StoreResult<Option<Slot>>;
    fn slots(&self) -> StoreResult<Vec<Slot>>;
    fn set_slot_available(&self, id: SlotId, available: bool) -> StoreResult<bool>;

    fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking>;
    fn booking(&self, id: BookingId) -> StoreResult<Option<Booking>>;
    fn bookings(&self) -> StoreResult<Vec<Booking>>;
    fn bookings_for_passenger(&self, passenger: PassengerId) -> StoreResult<Vec<Booking>>;
    fn set_booking_status(&self, id: BookingId, status: BookingStatus) -> StoreResult<bool>;
    fn delete_booking(&self, id: BookingId) -> StoreResult<bool>;

    fn append_chat(&self, message: ChatMessage) -> StoreResult<()>;
    /// Messages exchanged between `a` and `b` in either direction, oldest
    /// first
    fn chat_between(&self, a: UserRole, b: UserRole) -> StoreResult<Vec<ChatMessage>>;

    fn insert_item(&self, item: NewItem) -> StoreResult<InventoryItem>;
    fn item(&self, id: ItemId) -> StoreResult<Option<InventoryItem>>;
    fn items_by_role(&self, role: UserRole) -> StoreResult<Vec<InventoryItem>>;
    /// Overwrite condition, availability and checked-out flag of the item
    /// with the same id
    fn update_item(&self, item: &InventoryItem) -> StoreResult<bool>;

    fn insert_photographer(&self, name: &str) -> StoreResult<Photographer>;
    fn photographer(&self, id: PhotographerId) -> StoreResult<Option<Photographer>>;
    fn photographer_by_name(&self, name: &str) -> StoreResult<Option<Photographer>>;
    fn set_photographer_checked_out(
        &self,
        id: PhotographerId,
        checked_out: bool,
    ) -> StoreResult<bool>;
}
