//! Equipment inventory per role

use std::sync::Arc;

use inflight_core::{InventoryItem, ItemId, UserRole};
use serde::Deserialize;
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::store::{NewItem, RecordStore};

/// New state of an inventory item as sent by a client
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub id: ItemId,
    #[serde(default)]
    pub condition: String,
    pub available: bool,
    pub checked_out: bool,
}

pub struct InventoryService {
    store: Arc<dyn RecordStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn add(&self, item: NewItem) -> ServiceResult<InventoryItem> {
        Ok(self.store.insert_item(item)?)
    }

    pub fn by_role(&self, role: UserRole) -> ServiceResult<Vec<InventoryItem>> {
        Ok(self.store.items_by_role(role)?)
    }

    /// Overwrite the mutable fields of an existing item
    ///
    /// Only `condition`, `available` and `checked_out` are taken from
    /// `update`; name and owner stay as stored. An item cannot be checked
    /// out while unavailable.
    pub fn update(&self, update: ItemUpdate) -> ServiceResult<InventoryItem> {
        if update.checked_out && !update.available {
            return Err(ServiceError::CheckedOutUnavailable(update.id));
        }
        let mut item = self
            .store
            .item(update.id)?
            .ok_or(ServiceError::ItemNotFound(update.id))?;
        item.condition = update.condition;
        item.available = update.available;
        item.checked_out = update.checked_out;
        if !self.store.update_item(&item)? {
            return Err(ServiceError::ItemNotFound(item.id));
        }
        info!(
            item = item.id,
            available = item.available,
            checked_out = item.checked_out,
            "inventory item updated"
        );
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn service() -> (InventoryService, InventoryItem) {
        let service = InventoryService::new(Arc::new(Database::new()));
        let item = service
            .add(NewItem {
                name: "Camera".into(),
                condition: "new".into(),
                available: true,
                owner_role: UserRole::Photographer,
            })
            .unwrap();
        (service, item)
    }

    #[test]
    fn update_keeps_name_and_owner() {
        let (service, item) = service();
        let updated = service
            .update(ItemUpdate {
                id: item.id,
                condition: "scratched lens".into(),
                available: true,
                checked_out: true,
            })
            .unwrap();
        assert_eq!(updated.name, "Camera");
        assert_eq!(updated.owner_role, UserRole::Photographer);
        assert_eq!(service.by_role(UserRole::Photographer).unwrap(), vec![updated]);
        assert!(service.by_role(UserRole::Pilot).unwrap().is_empty());
    }

    #[test]
    fn checked_out_requires_available() {
        let (service, item) = service();
        let err = service
            .update(ItemUpdate {
                id: item.id,
                condition: String::new(),
                available: false,
                checked_out: true,
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::CheckedOutUnavailable(_)));
        assert_eq!(service.by_role(UserRole::Photographer).unwrap(), vec![item]);
    }

    #[test]
    fn unknown_item() {
        let (service, _) = service();
        let err = service
            .update(ItemUpdate {
                id: 99,
                condition: String::new(),
                available: true,
                checked_out: false,
            })
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
