use std::sync::Arc;

use inflight_core::{Photographer, PhotographerId};
use tracing::info;

use crate::error::ServiceResult;
use crate::store::{RecordStore, StoreError};

/// Photographers registered on the station, unique by name
pub struct PhotographerRegistry {
    store: Arc<dyn RecordStore>,
}

impl PhotographerRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Register `name`, or return the existing record if already known
    pub fn register(&self, name: &str) -> ServiceResult<Photographer> {
        if let Some(existing) = self.store.photographer_by_name(name)? {
            return Ok(existing);
        }
        match self.store.insert_photographer(name) {
            Ok(photographer) => {
                info!(photographer = photographer.id, name, "photographer registered");
                Ok(photographer)
            }
            // lost a race against another registration of the same name
            Err(err @ StoreError::Duplicate { .. }) => {
                Ok(self.store.photographer_by_name(name)?.ok_or(err)?)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn by_name(&self, name: &str) -> ServiceResult<Option<Photographer>> {
        Ok(self.store.photographer_by_name(name)?)
    }

    pub fn by_id(&self, id: PhotographerId) -> ServiceResult<Option<Photographer>> {
        Ok(self.store.photographer(id)?)
    }

    /// Returns whether the photographer exists
    pub fn set_checked_out(&self, id: PhotographerId, checked_out: bool) -> ServiceResult<bool> {
        Ok(self.store.set_photographer_checked_out(id, checked_out)?)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::database::Database;

    #[test]
    fn register_is_idempotent() {
        let registry = PhotographerRegistry::new(Arc::new(Database::new()));
        let first = registry.register("Nadia").unwrap();
        let again = registry.register("Nadia").unwrap();
        assert_eq!(first, again);
        assert_eq!(registry.by_id(first.id).unwrap(), Some(first.clone()));

        assert!(registry.set_checked_out(first.id, true).unwrap());
        assert!(registry.by_name("Nadia").unwrap().unwrap().checked_out);
        assert!(!registry.set_checked_out(first.id + 1, true).unwrap());
        assert_eq!(registry.by_name("Leo").unwrap(), None);
    }

    #[test]
    fn racing_registrations_share_one_record() {
        let registry = PhotographerRegistry::new(Arc::new(Database::new()));
        let ids: Vec<PhotographerId> = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| s.spawn(|| registry.register("Nadia").unwrap().id))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(ids.iter().all(|&id| id == ids[0]));
        assert_eq!(registry.by_id(ids[0] + 1).unwrap(), None);
    }
}
