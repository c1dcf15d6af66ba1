//! Passenger lookups and the on-site presence flag

use std::sync::Arc;

use inflight_core::{Passenger, PassengerId};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::store::RecordStore;

pub struct PassengerDirectory {
    store: Arc<dyn RecordStore>,
}

impl PassengerDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Look a passenger up by username; there is no password check
    pub fn login(&self, username: &str) -> ServiceResult<Passenger> {
        let passenger = self
            .store
            .passenger_by_username(username)?
            .ok_or_else(|| ServiceError::UnknownUsername(username.to_owned()))?;
        info!(passenger = passenger.passenger_id, "passenger logged in");
        Ok(passenger)
    }

    pub fn get(&self, id: PassengerId) -> ServiceResult<Passenger> {
        self.store
            .passenger(id)?
            .ok_or(ServiceError::PassengerNotFound(id))
    }

    pub fn all(&self) -> ServiceResult<Vec<Passenger>> {
        Ok(self.store.passengers()?)
    }

    pub fn set_checked_out(&self, id: PassengerId, checked_out: bool) -> ServiceResult<()> {
        if self.store.set_passenger_checked_out(id, checked_out)? {
            info!(passenger = id, checked_out, "passenger presence changed");
            Ok(())
        } else {
            Err(ServiceError::PassengerNotFound(id))
        }
    }

    /// Unknown passengers count as not checked out
    pub fn is_checked_out(&self, id: PassengerId) -> ServiceResult<bool> {
        Ok(self
            .store
            .passenger(id)?
            .is_some_and(|passenger| passenger.checked_out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::store::NewPassenger;

    #[test]
    fn login_and_presence() {
        let store = Arc::new(Database::new());
        let id = store
            .insert_passenger(NewPassenger::new("ada", 10))
            .unwrap()
            .passenger_id;
        let directory = PassengerDirectory::new(store);

        assert_eq!(directory.login("ada").unwrap().passenger_id, id);
        let err = directory.login("grace").unwrap_err();
        assert_eq!(err.to_string(), "Passenger not found");

        assert!(!directory.is_checked_out(id).unwrap());
        directory.set_checked_out(id, true).unwrap();
        assert!(directory.is_checked_out(id).unwrap());
        assert!(!directory.is_checked_out(404).unwrap());
        assert!(directory.set_checked_out(404, true).is_err());
    }
}
