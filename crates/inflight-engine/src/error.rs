use inflight_core::{
    BookingId, BookingStatus, Credits, ItemId, PassengerId, SlotId, UnknownTier,
};
use thiserror::Error;

use crate::store::StoreError;

/// Business-rule violations and store failures reported by the services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Passenger {0} not found")]
    PassengerNotFound(PassengerId),
    #[error("Passenger not found")]
    UnknownUsername(String),
    #[error("Slot not found")]
    SlotNotFound(SlotId),
    #[error("Booking {0} not found")]
    BookingNotFound(BookingId),
    #[error("Inventory item {0} not found")]
    ItemNotFound(ItemId),
    #[error("Slot {0} is not available")]
    SlotUnavailable(SlotId),
    #[error("Insufficient NovaCredits: balance {balance}, required {required}")]
    InsufficientCredits { balance: Credits, required: Credits },
    #[error("Balance of passenger {0} would overflow")]
    BalanceOverflow(PassengerId),
    #[error("Tier must be 1, 2 or 3 ({0})")]
    UnknownTier(#[from] UnknownTier),
    #[error("Booking {booking} is {status}; only pending bookings can be {action}")]
    NotPending {
        booking: BookingId,
        status: BookingStatus,
        action: &'static str,
    },
    #[error("Inventory item {0} cannot be checked out while unavailable")]
    CheckedOutUnavailable(ItemId),
    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Whether the error is about a referenced record that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::PassengerNotFound(_)
                | ServiceError::UnknownUsername(_)
                | ServiceError::SlotNotFound(_)
                | ServiceError::BookingNotFound(_)
                | ServiceError::ItemNotFound(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
