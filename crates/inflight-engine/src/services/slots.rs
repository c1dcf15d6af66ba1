//! Slot availability registry

use std::sync::Arc;

use inflight_core::{Slot, SlotId};

use crate::error::{ServiceError, ServiceResult};
use crate::store::RecordStore;

pub struct SlotRegistry {
    store: Arc<dyn RecordStore>,
}

impl SlotRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn available(&self) -> ServiceResult<Vec<Slot>> {
        let mut slots = self.store.slots()?;
        slots.retain(|slot| slot.available);
        Ok(slots)
    }

    pub fn all(&self) -> ServiceResult<Vec<Slot>> {
        Ok(self.store.slots()?)
    }

    pub fn get(&self, id: SlotId) -> ServiceResult<Slot> {
        self.store.slot(id)?.ok_or(ServiceError::SlotNotFound(id))
    }

    /// Only booking transactions flip availability, under the slot's lock.
    pub(crate) fn set_availability(&self, id: SlotId, available: bool) -> ServiceResult<()> {
        if self.store.set_slot_available(id, available)? {
            Ok(())
        } else {
            Err(ServiceError::SlotNotFound(id))
        }
    }
}
