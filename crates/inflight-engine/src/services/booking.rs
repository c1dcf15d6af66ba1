//! Booking lifecycle: reserve, approve, deny, cancel
//!
//! Every transaction runs inside the critical section of the booked slot
//! and, nested in it, the booking passenger. The availability check, the
//! debit, the booking insert and the availability flip are therefore one
//! step as seen by any other transaction, so of several concurrent
//! reservations of the same slot exactly one wins.

use std::sync::Arc;

use inflight_core::{
    Booking, BookingId, BookingStatus, CancellationRefund, Credits, PassengerId, SlotId, Tier,
};
use tracing::{info, warn};

use super::{Ledger, SlotRegistry};
use crate::error::{ServiceError, ServiceResult};
use crate::locks::{LockKey, LockTable};
use crate::signals::Signals;
use crate::store::{NewBooking, RecordStore};

/// Outcome of a successful reservation
#[derive(Clone, Debug)]
pub struct Reservation {
    pub booking: Booking,
    pub new_balance: Credits,
}

/// Outcome of a denial or cancellation
#[derive(Clone, Debug)]
pub struct Refund {
    pub booking: Booking,
    pub refund: Credits,
    pub new_balance: Credits,
}

pub struct BookingService {
    store: Arc<dyn RecordStore>,
    locks: Arc<LockTable>,
    ledger: Arc<Ledger>,
    slots: Arc<SlotRegistry>,
    signals: Arc<Signals>,
    refund_policy: CancellationRefund,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        locks: Arc<LockTable>,
        ledger: Arc<Ledger>,
        slots: Arc<SlotRegistry>,
        signals: Arc<Signals>,
        refund_policy: CancellationRefund,
    ) -> Self {
        Self {
            store,
            locks,
            ledger,
            slots,
            signals,
            refund_policy,
        }
    }

    /// Charge the tier price, create a pending booking and take the slot
    pub fn reserve(
        &self,
        passenger: PassengerId,
        slot: SlotId,
        tier: u8,
    ) -> ServiceResult<Reservation> {
        let tier = Tier::try_from(tier)?;
        let reservation = self.locks.with(LockKey::Slot(slot), || {
            self.locks
                .with(LockKey::Passenger(passenger), || self.reserve_locked(passenger, slot, tier))
        })?;
        info!(
            booking = reservation.booking.booking_id,
            passenger,
            slot,
            price = tier.price(),
            "slot reserved"
        );
        Ok(reservation)
    }

    fn reserve_locked(
        &self,
        passenger: PassengerId,
        slot: SlotId,
        tier: Tier,
    ) -> ServiceResult<Reservation> {
        self.store
            .passenger(passenger)?
            .ok_or(ServiceError::PassengerNotFound(passenger))?;
        if !self.slots.get(slot)?.available {
            return Err(ServiceError::SlotUnavailable(slot));
        }

        let price = tier.price();
        let new_balance = self.ledger.debit(passenger, price)?;
        let booking = match self.store.insert_booking(NewBooking {
            passenger_id: passenger,
            slot_id: slot,
            tier,
            status: BookingStatus::Pending,
        }) {
            Ok(booking) => booking,
            Err(err) => {
                warn!(passenger, slot, %err, "booking insert failed, refunding debit");
                self.ledger.credit(passenger, price)?;
                return Err(err.into());
            }
        };
        self.slots.set_availability(slot, false)?;
        Ok(Reservation {
            booking,
            new_balance,
        })
    }

    /// Move a pending booking to approved
    pub fn approve(&self, id: BookingId) -> ServiceResult<Booking> {
        self.with_booking(id, |mut booking| {
            ensure_pending(&booking, "approved")?;
            self.set_status(id, BookingStatus::Approved)?;
            booking.status = BookingStatus::Approved;
            info!(booking = id, "booking approved");
            Ok(booking)
        })
    }

    /// Move a pending booking to denied and refund the full tier price
    ///
    /// The slot stays taken until the booking is cancelled.
    pub fn deny(&self, id: BookingId) -> ServiceResult<Refund> {
        self.with_booking(id, |mut booking| {
            ensure_pending(&booking, "denied")?;
            let refund = booking.tier.price();
            let new_balance = self.ledger.credit(booking.passenger_id, refund)?;
            self.set_status(id, BookingStatus::Denied)?;
            self.slots.set_availability(booking.slot_id, false)?;
            booking.status = BookingStatus::Denied;
            info!(booking = id, refund, "booking denied");
            Ok(Refund {
                booking,
                refund,
                new_balance,
            })
        })
    }

    /// Delete the booking, refund 75% of the tier price and free the slot
    ///
    /// The refund is paid whatever the booking's status, so a denied booking
    /// that is cancelled afterwards has returned 175% of its price in total.
    pub fn cancel(&self, id: BookingId) -> ServiceResult<Refund> {
        self.with_booking(id, |booking| {
            let passenger = self
                .store
                .passenger(booking.passenger_id)?
                .ok_or(ServiceError::PassengerNotFound(booking.passenger_id))?;
            self.slots.get(booking.slot_id)?;

            let refund = booking.tier.cancellation_refund(self.refund_policy);
            let new_balance = self.ledger.credit(passenger.passenger_id, refund)?;
            self.store.delete_booking(id)?;
            self.slots.set_availability(booking.slot_id, true)?;
            self.signals.register_cancellation(passenger.username);
            info!(booking = id, refund, slot = booking.slot_id, "booking cancelled");
            Ok(Refund {
                booking,
                refund,
                new_balance,
            })
        })
    }

    pub fn get(&self, id: BookingId) -> ServiceResult<Booking> {
        self.store
            .booking(id)?
            .ok_or(ServiceError::BookingNotFound(id))
    }

    pub fn all(&self) -> ServiceResult<Vec<Booking>> {
        Ok(self.store.bookings()?)
    }

    pub fn for_passenger(&self, passenger: PassengerId) -> ServiceResult<Vec<Booking>> {
        Ok(self.store.bookings_for_passenger(passenger)?)
    }

    pub fn with_status(&self, status: BookingStatus) -> ServiceResult<Vec<Booking>> {
        let mut bookings = self.store.bookings()?;
        bookings.retain(|b| b.status == status);
        Ok(bookings)
    }

    /// Run `f` on the current state of the booking while holding the locks
    /// of its slot and passenger
    fn with_booking<R>(
        &self,
        id: BookingId,
        f: impl FnOnce(Booking) -> ServiceResult<R>,
    ) -> ServiceResult<R> {
        let slot = self.get(id)?.slot_id;
        self.locks.with(LockKey::Slot(slot), || {
            // re-read: a concurrent cancel may have removed it meanwhile
            let booking = self.get(id)?;
            self.locks
                .with(LockKey::Passenger(booking.passenger_id), || f(booking))
        })
    }

    fn set_status(&self, id: BookingId, status: BookingStatus) -> ServiceResult<()> {
        if self.store.set_booking_status(id, status)? {
            Ok(())
        } else {
            Err(ServiceError::BookingNotFound(id))
        }
    }
}

fn ensure_pending(booking: &Booking, action: &'static str) -> ServiceResult<()> {
    match booking.status {
        BookingStatus::Pending => Ok(()),
        status => Err(ServiceError::NotPending {
            booking: booking.booking_id,
            status,
            action,
        }),
    }
}
