//! NovaCredit balances

use std::sync::Arc;

use inflight_core::{Credits, PassengerId};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::locks::{LockKey, LockTable};
use crate::store::RecordStore;

/// Top-ups and deductions, each inside the passenger's critical section
pub struct Ledger {
    store: Arc<dyn RecordStore>,
    locks: Arc<LockTable>,
}

impl Ledger {
    pub fn new(store: Arc<dyn RecordStore>, locks: Arc<LockTable>) -> Self {
        Self { store, locks }
    }

    /// Add `amount` to the balance and return the new balance
    pub fn top_up(&self, passenger: PassengerId, amount: Credits) -> ServiceResult<Credits> {
        let balance = self
            .locks
            .with(LockKey::Passenger(passenger), || self.credit(passenger, amount))?;
        info!(passenger, amount, balance, "NovaCredits topped up");
        Ok(balance)
    }

    /// Subtract `amount` if the balance covers it and return the new balance
    pub fn deduct(&self, passenger: PassengerId, amount: Credits) -> ServiceResult<Credits> {
        let balance = self
            .locks
            .with(LockKey::Passenger(passenger), || self.debit(passenger, amount))?;
        info!(passenger, amount, balance, "NovaCredits deducted");
        Ok(balance)
    }

    /// Apply a signed change: positive tops up, negative deducts
    pub fn adjust(&self, passenger: PassengerId, delta: i64) -> ServiceResult<Credits> {
        let magnitude = Credits::try_from(delta.unsigned_abs());
        match (delta >= 0, magnitude) {
            (true, Ok(amount)) => self.top_up(passenger, amount),
            (false, Ok(amount)) => self.deduct(passenger, amount),
            (true, Err(_)) => Err(ServiceError::BalanceOverflow(passenger)),
            (false, Err(_)) => {
                let balance = self.balance(passenger)?;
                Err(ServiceError::InsufficientCredits {
                    balance,
                    required: Credits::MAX,
                })
            }
        }
    }

    pub fn balance(&self, passenger: PassengerId) -> ServiceResult<Credits> {
        Ok(self
            .store
            .passenger(passenger)?
            .ok_or(ServiceError::PassengerNotFound(passenger))?
            .nova_credits)
    }

    /// Credit without locking; the caller holds the passenger's lock
    pub(crate) fn credit(&self, passenger: PassengerId, amount: Credits) -> ServiceResult<Credits> {
        let balance = self
            .balance(passenger)?
            .checked_add(amount)
            .ok_or(ServiceError::BalanceOverflow(passenger))?;
        self.write(passenger, balance)
    }

    /// Debit without locking; the caller holds the passenger's lock
    pub(crate) fn debit(&self, passenger: PassengerId, amount: Credits) -> ServiceResult<Credits> {
        let balance = self.balance(passenger)?;
        let remaining = balance
            .checked_sub(amount)
            .ok_or(ServiceError::InsufficientCredits {
                balance,
                required: amount,
            })?;
        self.write(passenger, remaining)
    }

    fn write(&self, passenger: PassengerId, balance: Credits) -> ServiceResult<Credits> {
        if self.store.set_nova_credits(passenger, balance)? {
            Ok(balance)
        } else {
            Err(ServiceError::PassengerNotFound(passenger))
        }
    }
}
